use crate::config::Config;
use crate::error::MonitorError;
use crate::thingspeak::ThingSpeakClient;
use omron_env_lib::{PortSettings, Reading, SensorLink};
use std::path::PathBuf;
use tokio::task;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Periodic read-and-upload loop.
pub struct Monitor {
    config_path: PathBuf,
    config: Config,
}

impl Monitor {
    pub fn new(config_path: PathBuf, config: Config) -> Self {
        Self { config_path, config }
    }

    /// Run cycles forever. The first cycle starts one interval after the call.
    pub async fn run(mut self) {
        let period = self.config.interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_minutes = self.config.sensor.scheduler.interval_minutes,
            "Monitoring started. Press Ctrl+C to exit."
        );

        loop {
            ticker.tick().await;
            self.reload_config();
            report(&run_cycle(&self.config).await);
        }
    }

    /// Pick up edits to the config file; keep the last good config on failure.
    fn reload_config(&mut self) {
        match Config::load(&self.config_path) {
            Ok(config) => self.config = config,
            Err(e) => warn!("Keeping previous configuration: {}", e),
        }
    }
}

/// Read the sensor once and upload the result.
pub async fn run_cycle(config: &Config) -> Result<(), MonitorError> {
    let reading = collect_reading(config.port_settings()).await?;
    info!("{}", reading);
    let client = ThingSpeakClient::new(&config.thingspeak)?;
    client.send(&reading).await
}

/// Take one reading on the blocking pool, releasing the port afterwards.
pub async fn collect_reading(settings: PortSettings) -> Result<Reading, MonitorError> {
    let reading = task::spawn_blocking(move || {
        let mut link = SensorLink::new(settings);
        let result = link.connect().and_then(|_| link.get_reading());
        link.cleanup();
        result
    })
    .await??;
    Ok(reading)
}

/// Run a single cycle, logging and returning its outcome.
pub async fn run_once(config: &Config) -> Result<(), MonitorError> {
    let result = run_cycle(config).await;
    report(&result);
    result
}

pub fn report(result: &Result<(), MonitorError>) {
    match result {
        Ok(()) => {}
        Err(e @ (MonitorError::Sensor(_) | MonitorError::UploadRejected { .. })) => error!("{}", e),
        Err(e) => error!("An error occurred: {}", e),
    }
}
