//! voxgi - voxel light propagation viewer

use std::path::PathBuf;
use std::process::ExitCode;

use voxgi::core::{
    config::AppConfig,
    error::Error,
    logging,
    types::Result,
};
use voxgi::render::window;

fn main() -> ExitCode {
    logging::init();
    log::info!("voxgi starting...");

    let args: Vec<String> = std::env::args().collect();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match window::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file (if any) with command line overrides applied
fn load_config(args: &[String]) -> Result<AppConfig> {
    let mut config = match parse_config_arg(args) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    if let Some(scene) = find_arg(args, "--scene") {
        config.scene = scene.parse()?;
    }
    if let Some(seed) = find_arg(args, "--seed") {
        let seed = seed
            .parse()
            .map_err(|_| Error::Config(format!("invalid seed '{seed}'")))?;
        config.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Parse --config argument from command line
fn parse_config_arg(args: &[String]) -> Option<PathBuf> {
    find_arg(args, "--config").map(PathBuf::from)
}

/// Value following `flag`
fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxgi::voxel::SceneKind;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_overrides() {
        let config = load_config(&args(&["voxgi", "--scene", "simple_room", "--seed", "9"])).unwrap();
        assert_eq!(config.scene, SceneKind::SimpleRoom);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(load_config(&args(&["voxgi", "--scene", "teapot"])).is_err());
        assert!(load_config(&args(&["voxgi", "--seed", "-1"])).is_err());
        assert!(load_config(&args(&["voxgi", "--config", "/nonexistent/voxgi.json"])).is_err());
        assert_eq!(parse_config_arg(&args(&["voxgi", "--config"])), None);
    }
}
