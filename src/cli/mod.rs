//! CLI module
//!
//! Command-line interface for sidcfg.

mod args;

pub use args::{Args, Commands};

use anyhow::{Context, Result};
use sidcfg::config::{self, IniConfig, Settings};
use sidcfg::util::{FixedPaths, PathResolver, SystemPaths};

/// Platform directories, with any overrides given on the command line
pub fn resolver(args: &Args) -> Box<dyn PathResolver> {
    if args.config_dir.is_none() && args.data_dir.is_none() {
        return Box::new(SystemPaths);
    }

    Box::new(FixedPaths {
        config_dir: args.config_dir.clone().or_else(|| SystemPaths.config_dir()),
        data_dir: args.data_dir.clone().or_else(|| SystemPaths.data_dir()),
        portable_dir: None,
    })
}

/// Load the settings and print them
pub fn show(paths: &dyn PathResolver, json: bool) -> Result<()> {
    let mut config = IniConfig::new();

    if let Err(e) = config.read(paths) {
        // Fall back to the built-in defaults
        tracing::error!("{}", e);
    } else if let Some(file) = config.file_name() {
        tracing::info!("Loaded configuration from {:?}", file);
    }

    println!("{}", render(config.settings(), json)?);
    Ok(())
}

/// Print the config file path
pub fn path(paths: &dyn PathResolver) -> Result<()> {
    let path = config::config_path(paths).context("Failed to resolve config file location")?;
    println!("{}", path.display());
    Ok(())
}

fn render(settings: &Settings, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(settings).context("Failed to serialize settings")
    } else {
        toml::to_string_pretty(settings).context("Failed to serialize settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_render_toml() {
        let text = render(&Settings::default(), false).unwrap();
        assert!(text.contains("[general]"));
        assert!(text.contains("record_length = 210000"));
        assert!(text.contains("decorations = \"bright white\""));
        assert!(text.contains("sampling_method = \"RESAMPLE\""));
    }

    #[test]
    fn test_render_json() {
        let text = render(&Settings::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["audio"]["frequency"], 48000);
        assert_eq!(value["emulation"]["model_default"], "PAL");
        assert_eq!(value["console"]["top_left"], "┌");
    }

    #[test]
    fn test_overrides_use_fixed_paths() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().into_owned();
        let args = Args::parse_from(["sidcfg", "--config-dir", &dir_arg, "path"]);
        let paths = resolver(&args);

        let file = config::config_path(paths.as_ref()).unwrap();
        assert_eq!(file, dir.path().join("sidplayfp").join("sidplayfp.ini"));

        let mut config = IniConfig::new();
        config.read(paths.as_ref()).unwrap();
        assert!(file.is_file());
        assert_eq!(config.file_name(), Some(file.as_path()));
    }
}
