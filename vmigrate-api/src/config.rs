use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How long the simulated transfer of a run takes.
    #[serde(default = "default_transfer_delay")]
    pub transfer_delay_ms: u64,

    /// Upper bound on a single transfer before the run is failed.
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    std::env::var("VMIGRATE_BIND").unwrap_or_else(|_| "0.0.0.0:3131".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("VMIGRATE_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("vmigrate").join("vmigrate.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".vmigrate").join("vmigrate.db")
    }
}

fn default_transfer_delay() -> u64 {
    std::env::var("VMIGRATE_TRANSFER_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10_000) // 10 seconds
}

fn default_transfer_timeout() -> u64 {
    std::env::var("VMIGRATE_TRANSFER_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(600) // 10 minutes
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            transfer_delay_ms: default_transfer_delay(),
            transfer_timeout_secs: default_transfer_timeout(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn transfer_delay(&self) -> Duration {
        Duration::from_millis(self.transfer_delay_ms)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}
