use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod compositor;
pub mod export;
pub mod interaction;
pub mod placement;
pub mod registry;
pub mod session;
pub mod settings;
pub mod startup_checks;

#[cfg(test)]
mod test_support;

pub use session::Session;
pub use settings::WatermarkSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub registry: RegistryConfig,
    pub render: RenderConfig,
    pub export: ExportConfig,
    /// Settings a new session starts with.
    pub watermark: WatermarkSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub max_files: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_path: PathBuf,
    /// Fixed preview container; when unset each image renders at its
    /// natural size.
    pub viewport: Option<ViewportConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_directory: PathBuf,
    pub filename_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Inkmark".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_files: registry::DEFAULT_MAX_FILES,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from(compositor::DEFAULT_FONT_PATH),
            viewport: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("watermarked"),
            filename_prefix: export::DEFAULT_FILENAME_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml_edit::de::Error),
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml_edit::de::from_str::<Config>(content)?)
    }

    /// Load from `path`, or fall back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}
