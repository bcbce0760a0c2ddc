//! Startup configuration loaded from JSON

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::camera_controller::RotationMode;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::lighting::grid::GridConfig;
use crate::voxel::scene::{DEFAULT_EMISSIVE_RATE, SceneKind};

/// Everything the binary needs to start. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub scene: SceneKind,
    /// Per-channel emitter probability for the inverted sphere
    pub emissive_rate: f32,
    /// Seed for scene speckling and direction sampling. Random when absent.
    pub seed: Option<u64>,
    pub grid: GridConfig,
    pub camera: CameraConfig,
    /// Frame-rate cap. `None` runs uncapped.
    pub target_fps: Option<u32>,
    /// Directory holding the WGSL sources. Defaults to `<crate>/shaders`.
    pub shader_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scene: SceneKind::default(),
            emissive_rate: DEFAULT_EMISSIVE_RATE,
            seed: None,
            grid: GridConfig::default(),
            camera: CameraConfig::default(),
            target_fps: Some(30),
            shader_dir: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "voxgi".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Fly-camera tuning
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Units per second
    pub movement_speed: f32,
    /// Radians per second per viewport-normalized mouse unit
    pub rotate_speed: f32,
    pub rotation_mode: RotationMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            movement_speed: 10.0,
            rotate_speed: 60.0,
            rotation_mode: RotationMode::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config("window size must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.emissive_rate) {
            return Err(Error::Config(format!(
                "emissive_rate {} must be in [0, 1]",
                self.emissive_rate
            )));
        }
        if self.target_fps == Some(0) {
            return Err(Error::Config(
                "target_fps must be positive; omit it to run uncapped".into(),
            ));
        }
        Ok(())
    }

    /// Shader directory to load WGSL from
    pub fn shader_dir(&self) -> PathBuf {
        self.shader_dir
            .clone()
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"))
    }
}
