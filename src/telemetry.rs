//! Trace logging for capture and store debugging, off unless requested.

use crate::config::AppConfig;
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_STATE: OnceLock<bool> = OnceLock::new();

/// Install the global JSON subscriber once, if the config asks for logs.
/// Returns whether trace logging ended up active. A log file that cannot
/// be opened or a global slot already claimed disables logging quietly;
/// the app never fails over telemetry.
pub fn init_tracing(config: &AppConfig) -> bool {
    *TRACING_STATE.get_or_init(|| wants_logs(config) && install(&trace_destination()))
}

fn wants_logs(config: &AppConfig) -> bool {
    config.logs && !config.no_logs
}

fn trace_destination() -> PathBuf {
    env::var("VITALSCAN_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("vitalscan_trace.jsonl"))
}

fn install(path: &Path) -> bool {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(file)
        .with_current_span(false)
        .with_span_list(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
