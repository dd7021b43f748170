//! Upload of readings to a ThingSpeak channel.
//!
//! One GET per reading against the channel update endpoint, with the write
//! key and the six measurements as `field1`..`field6` query parameters.

use crate::config::ThingSpeakConfig;
use crate::error::MonitorError;
use omron_env_lib::Reading;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_UPDATE_URL: &str = "https://api.thingspeak.com/update";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ThingSpeakClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl ThingSpeakClient {
    pub fn new(config: &ThingSpeakConfig) -> Result<Self, MonitorError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: &ThingSpeakConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn send(&self, reading: &Reading) -> Result<(), MonitorError> {
        let fields = update_fields(reading);
        debug!(url = %self.url, ?fields, "Sending update to ThingSpeak");

        let response = self
            .http
            .get(&self.url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(&fields[..])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MonitorError::UploadRejected { status });
        }
        info!("Data sent to ThingSpeak successfully");
        Ok(())
    }
}

/// Channel field assignment for one reading.
pub fn update_fields(reading: &Reading) -> [(&'static str, String); 6] {
    [
        ("field1", reading.temperature_c.to_string()),
        ("field2", reading.humidity_pct.to_string()),
        ("field3", reading.light.to_string()),
        ("field4", reading.pressure_hpa.to_string()),
        ("field5", reading.noise_db.to_string()),
        ("field6", reading.co2_ppm.to_string()),
    ]
}
