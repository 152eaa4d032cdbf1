//! Application-level configuration loading: link device and ledger location.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the host looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BUZZ_HOST_CONFIG_PATH";
/// Device the microcontroller enumerates as on the reference deployment.
const DEFAULT_DEVICE: &str = "/dev/ttyACM0";
/// Database file used when the configuration does not name one.
const DEFAULT_DB_PATH: &str = "buzzer_game.db";
/// Opening the port resets the microcontroller; this covers its boot window.
const DEFAULT_SETTLE_MS: u64 = 2000;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Link transport parameters.
    pub link: LinkConfig,
    /// Ledger storage parameters.
    pub storage: StorageConfig,
}

/// Transport parameters for the microcontroller link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Character device the microcontroller is attached to. Line discipline
    /// (baud, parity) is expected to be configured out-of-band.
    pub device: PathBuf,
    /// Delay applied once after opening the device.
    pub settle: Duration,
}

/// Storage parameters for the round ledger.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Database file holding rounds and buzzes.
    pub path: PathBuf,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        device = %config.link.device.display(),
                        db = %config.storage.path.display(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig {
                device: PathBuf::from(DEFAULT_DEVICE),
                settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            },
            storage: StorageConfig {
                path: PathBuf::from(DEFAULT_DB_PATH),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    link: RawLinkConfig,
    #[serde(default)]
    storage: RawStorageConfig,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the link section; absent fields keep their defaults.
struct RawLinkConfig {
    device: Option<PathBuf>,
    settle_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the storage section; absent fields keep their defaults.
struct RawStorageConfig {
    path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();

        Self {
            link: LinkConfig {
                device: value.link.device.unwrap_or(defaults.link.device),
                settle: value
                    .link
                    .settle_ms
                    .map_or(defaults.link.settle, Duration::from_millis),
            },
            storage: StorageConfig {
                path: value.storage.path.unwrap_or(defaults.storage.path),
            },
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
