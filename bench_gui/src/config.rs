use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bench_core::csv_table::CsvDialect;
use bench_core::logging::{self, LogLevel};
use serde::{Deserialize, Serialize};

const CONFIG_VERSION: u32 = 1;
const CONFIG_FILE: &str = "bench_gui.toml";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_CHILD_WIDTH: u32 = 1600;
const DEFAULT_CHILD_HEIGHT: u32 = 900;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "config io failed for {}: {}", path.display(), source)
            }
            ConfigError::Parse(err) => write!(f, "config parse failed: {}", err),
            ConfigError::Serialize(err) => write!(f, "config serialize failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub version: u32,
    pub csv_path: Option<String>,
    pub data_dir: Option<String>,
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub quoted_csv: bool,
    pub launcher_closes_on_open: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            csv_path: None,
            data_dir: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_level: "info".to_string(),
            quoted_csv: false,
            launcher_closes_on_open: true,
            window_width: DEFAULT_CHILD_WIDTH,
            window_height: DEFAULT_CHILD_HEIGHT,
        }
    }
}

impl BenchConfig {
    /// Reads the user config, falling back to defaults when it is missing,
    /// unreadable or from another version.
    pub fn load() -> Self {
        let path = config_path();
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                logging::warn(format!("{}; using defaults", err));
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&contents).map(Some)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: BenchConfig = toml::from_str(contents)?;
        if config.version != CONFIG_VERSION {
            logging::warn(format!(
                "config version {} != {}; using defaults",
                config.version, CONFIG_VERSION
            ));
            return Ok(Self::default());
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let data = self.to_toml()?;
        fs::write(path, data).map_err(io_err)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }

    pub fn csv_dialect(&self) -> CsvDialect {
        if self.quoted_csv {
            CsvDialect::quoted()
        } else {
            CsvDialect::naive()
        }
    }
}

fn config_path() -> PathBuf {
    config_path_with(|key| std::env::var_os(key))
}

fn config_path_with(var: impl Fn(&str) -> Option<std::ffi::OsString>) -> PathBuf {
    if let Some(appdata) = var("APPDATA") {
        return PathBuf::from(appdata).join("CompilerBench").join(CONFIG_FILE);
    }
    if let Some(config) = var("XDG_CONFIG_HOME") {
        return PathBuf::from(config)
            .join("compiler_bench")
            .join(CONFIG_FILE);
    }
    if let Some(home) = var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("compiler_bench")
            .join(CONFIG_FILE);
    }
    PathBuf::from(CONFIG_FILE)
}
