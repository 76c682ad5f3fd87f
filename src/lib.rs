//! Shared vitalscan library exports that keep the IPC binary and tests aligned.

pub mod chat;
pub mod config;
pub mod identity;
pub mod ipc;
pub mod media;
pub mod notice;
pub mod scoring;
pub mod skin;
pub mod store;
pub mod survey;
mod telemetry;
pub mod tips;
pub mod trends;
pub mod wizard;

pub use config::AppConfig;
pub use telemetry::init_tracing;
