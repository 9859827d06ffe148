//! `primstage.toml` configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "primstage.toml";

/// Top-level configuration. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub cone: ConeConfig,
    pub sphere: SphereConfig,
    pub icosphere: IcosphereConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory generated layers are written to.
    pub dir: PathBuf,
    /// `"text"` or `"binary"`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("primstage_output"),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConeConfig {
    pub resolution: u32,
    pub height: f32,
    pub radius: f32,
    pub base_cap: bool,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self {
            resolution: 12,
            height: 2.0,
            radius: 1.0,
            base_cap: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SphereConfig {
    pub resolution: u32,
    pub radius: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            resolution: 16,
            radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IcosphereConfig {
    pub radius: f32,
    pub subdivision: u32,
}

impl Default for IcosphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            subdivision: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Recorded as `creator` in every generated layer.
    pub creator: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            creator: "primstage".into(),
        }
    }
}

/// Parse configuration text.
pub fn parse_config(content: &str) -> Result<Config, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

/// Load a config from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let config =
        parse_config(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load the config, falling back to defaults if the file doesn't exist.
///
/// A file that exists but does not parse is still an error.
pub fn load_or_default(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    load_config(path)
}
