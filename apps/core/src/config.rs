use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prober::ProbeStrategy;

const APP_DIR_NAME: &str = "prefview";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Which registry hive the preferences live under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefsTarget {
    /// Preferences written while playing inside the editor.
    #[default]
    Editor,
    /// Preferences written by a standalone build.
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub company_name: String,
    pub product_name: String,
    pub target: PrefsTarget,
    pub probe_strategy: ProbeStrategy,
    pub show_raw_keys: bool,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company_name: "DefaultCompany".to_string(),
            product_name: "My project".to_string(),
            target: PrefsTarget::Editor,
            probe_strategy: ProbeStrategy::Sentinel,
            show_raw_keys: false,
            config_path: default_config_path(),
        }
    }
}

impl Config {
    /// Registry subkey under `HKEY_CURRENT_USER` holding this product's preferences.
    pub fn registry_subkey(&self) -> String {
        match self.target {
            PrefsTarget::Editor => format!(
                r"Software\Unity\UnityEditor\{}\{}",
                self.company_name, self.product_name
            ),
            PrefsTarget::Player => {
                format!(r"Software\{}\{}", self.company_name, self.product_name)
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(app_data) = std::env::var_os("APPDATA").filter(|value| !value.is_empty()) {
            return PathBuf::from(app_data).join("PrefView");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|value| !value.is_empty()) {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Some(home) = std::env::var_os("HOME").filter(|value| !value.is_empty()) {
            return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        }
    }

    std::env::temp_dir().join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

/// Loads the config at `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(Config {
            config_path: path,
            ..Config::default()
        });
    }

    let raw = std::fs::read_to_string(&path)?;
    let mut config = parse(&path, &raw)?;
    config.config_path = path;
    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    validate(config)?;
    if let Some(parent) = config.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::Parse(format!("failed to encode config: {e}")))?;
    std::fs::write(&config.config_path, encoded)?;
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    validate_name("company_name", &cfg.company_name)?;
    validate_name("product_name", &cfg.product_name)?;

    if cfg.config_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("config_path is required".into()));
    }

    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} is required")));
    }
    if value.contains('\\') {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain a backslash"
        )));
    }
    Ok(())
}

fn parse(path: &Path, raw: &str) -> Result<Config, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" | "json5" => json5::from_str::<Config>(raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display()))),
        _ => toml::from_str::<Config>(raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display()))),
    }
}
