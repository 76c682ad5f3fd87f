//! Runtime configuration so store credentials and capture behavior resolve consistently.

use clap::Parser;

/// Runtime configuration parsed from CLI flags and environment.
#[derive(Debug, Parser, Clone)]
#[command(about = "vitalscan", author, version)]
pub struct AppConfig {
    /// Base URL of the hosted health-data store (PostgREST dialect)
    #[arg(long = "store-url", env = "VITALSCAN_STORE_URL")]
    pub store_url: Option<String>,

    /// Publishable API key for the hosted store
    #[arg(long = "store-key", env = "VITALSCAN_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// Signed-in user id to start the session with
    #[arg(long = "user-id", env = "VITALSCAN_USER")]
    pub user_id: Option<String>,

    /// Audio input device name or index (default input device if omitted)
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// List available audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Enable local trace logging
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Disable all local logging, overriding --logs
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Whether both store coordinates are present, enabling the REST store.
    #[must_use]
    pub fn store_configured(&self) -> bool {
        matches!(
            (&self.store_url, &self.store_key),
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty()
        )
    }
}
