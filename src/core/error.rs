//! Error types for the voxgi renderer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the renderer
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Shader '{name}' not found at {}", path.display())]
    ShaderNotFound { name: String, path: PathBuf },

    #[error("Shader '{name}' failed to compile:\n{diagnostic}")]
    ShaderCompile { name: String, diagnostic: String },

    #[error("Shader program '{name}' failed to link: {reason}")]
    ShaderLink { name: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Lighting pipeline error: {0}")]
    Pipeline(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
