//! Byte transport underneath [`SensorLink`](crate::SensorLink).
//!
//! The link only needs a duplex byte stream whose pending input can be
//! discarded. [`SerialConnector`] opens a real port through `serialport`;
//! anything else implementing [`Connector`] can stand in for it.

use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Serial port parameters. Framing is always 8-N-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub path: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl PortSettings {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// An open, exclusively owned byte stream to the sensor.
pub trait Transport: Read + Write + Send {
    /// Drop any bytes received but not yet read.
    fn clear_input(&mut self) -> io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn clear_input(&mut self) -> io::Result<()> {
        self.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// Opens transports on demand.
pub trait Connector {
    type Transport: Transport;

    fn open(&self, settings: &PortSettings) -> io::Result<Self::Transport>;
}

/// Opens the sensor's USB serial port.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    type Transport = Box<dyn SerialPort>;

    fn open(&self, settings: &PortSettings) -> io::Result<Self::Transport> {
        let port = serialport::new(&settings.path, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.read_timeout)
            .open()?;
        Ok(port)
    }
}
