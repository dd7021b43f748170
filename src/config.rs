use crate::error::MonitorError;
use crate::thingspeak::DEFAULT_UPDATE_URL;
use omron_env_lib::PortSettings;
use omron_env_lib::constants::DEFAULT_BAUD_RATE;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Longest accepted schedule interval, one week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub sensor: SensorConfig,
    pub thingspeak: ThingSpeakConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorConfig {
    pub omron: OmronConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OmronConfig {
    /// Serial port of the sensor, e.g. /dev/ttyUSB1
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Minutes between two monitoring cycles
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThingSpeakConfig {
    /// Channel write API key
    pub api_key: String,
    #[serde(default = "default_update_url")]
    pub url: String,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_update_url() -> String {
    DEFAULT_UPDATE_URL.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path).map_err(|source| MonitorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| MonitorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.sensor.omron.port.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("sensor.omron.port is empty".to_string()));
        }
        if self.sensor.scheduler.interval_minutes == 0 {
            return Err(MonitorError::InvalidConfig(
                "sensor.scheduler.interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.sensor.scheduler.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(MonitorError::InvalidConfig(format!(
                "sensor.scheduler.interval_minutes must be at most {} (one week)",
                MAX_INTERVAL_MINUTES
            )));
        }
        if self.thingspeak.api_key.trim().is_empty() {
            return Err(MonitorError::InvalidConfig("thingspeak.api_key is empty".to_string()));
        }
        Ok(())
    }

    pub fn port_settings(&self) -> PortSettings {
        PortSettings::new(&self.sensor.omron.port).with_baud_rate(self.sensor.omron.baud_rate)
    }

    pub fn interval(&self) -> Duration {
        let minutes = self.sensor.scheduler.interval_minutes.min(MAX_INTERVAL_MINUTES);
        Duration::from_secs(minutes * 60)
    }
}
