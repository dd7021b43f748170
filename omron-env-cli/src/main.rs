use anyhow::{Result, bail};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use omron_env_lib::{PortSettings, Reading, SensorLink};
use omron_env_lib::constants::{DEFAULT_BAUD_RATE, MIN_READ_INTERVAL};
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Read measurements from an Omron 2JCIE-BU01 environment sensor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port of the sensor.
    #[arg(short, long, default_value = "/dev/ttyUSB1")]
    port: String,
    /// Serial baud rate.
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Number of readings to take.
    #[arg(short, long, default_value_t = 1)]
    samples: u32,
    /// Keep reading until interrupted.
    #[arg(short, long)]
    continuous: bool,
    /// Print each reading as a JSON object.
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(cli.verbose.tracing_level_filter().into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let settings = PortSettings::new(&cli.port).with_baud_rate(cli.baud);
    let mut link = SensorLink::new(settings);

    let iterations = if cli.continuous { u32::MAX } else { cli.samples };
    let mut failures = 0u32;

    for i in 0..iterations {
        match link.get_reading() {
            Ok(reading) => print_reading(&reading, cli.json)?,
            Err(e) => {
                error!("[Sample {}] Failed to get sensor data: {}", i + 1, e);
                failures += 1;
                if e.is_transport_fault() {
                    warn!("Serial link lost; reconnecting on the next sample");
                }
                // Failed reads don't arm the rate limiter; avoid spinning on a missing port
                thread::sleep(MIN_READ_INTERVAL);
            }
        }
    }

    link.cleanup();

    if failures > 0 {
        bail!("{} of {} readings failed", failures, iterations);
    }
    info!("Finished reading.");
    Ok(())
}

fn print_reading(reading: &Reading, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(reading)?);
    } else {
        println!("{}", reading);
    }
    Ok(())
}
