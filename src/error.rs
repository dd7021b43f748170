// src/error.rs

use omron_env_lib::SensorError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by one monitoring cycle or by loading the configuration.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to get sensor data: {0}")]
    Sensor(#[from] SensorError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to send data to ThingSpeak. Status code: {}", status.as_u16())]
    UploadRejected { status: reqwest::StatusCode },

    #[error("Sensor worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
