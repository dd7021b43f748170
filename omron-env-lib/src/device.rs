use crate::constants::{MIN_READ_INTERVAL, RESPONSE_FRAME_SIZE, SETTLE_DELAY};
use crate::error::SensorError;
use crate::packet::Command;
use crate::reading::{LatestDataRaw, Reading};
use crate::transport::{Connector, PortSettings, SerialConnector, Transport};
use std::io::{self, ErrorKind};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Delays applied around each exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Minimum spacing between two successful reads.
    pub min_read_interval: Duration,
    /// Wait between writing a command and reading its reply.
    pub settle_delay: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            min_read_interval: MIN_READ_INTERVAL,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Connection state of a [`SensorLink`].
#[derive(Debug)]
pub enum LinkState<T> {
    Disconnected,
    Connected(T),
}

impl<T> LinkState<T> {
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected(_))
    }
}

/// A connection to an Omron 2JCIE-BU01 environment sensor.
///
/// The link opens its port lazily, spaces reads at least
/// [`LinkTiming::min_read_interval`] apart and drops the port after any I/O
/// fault so the next request starts from a fresh connection. All waits block
/// the calling thread.
pub struct SensorLink<C: Connector = SerialConnector> {
    settings: PortSettings,
    timing: LinkTiming,
    connector: C,
    state: LinkState<C::Transport>,
    last_read: Option<Instant>,
}

impl SensorLink<SerialConnector> {
    /// Create a link to the serial port described by `settings`. No port is opened yet.
    pub fn new(settings: PortSettings) -> Self {
        Self::with_connector(settings, SerialConnector)
    }
}

impl<C: Connector> SensorLink<C> {
    pub fn with_connector(settings: PortSettings, connector: C) -> Self {
        Self {
            settings,
            timing: LinkTiming::default(),
            connector,
            state: LinkState::Disconnected,
            last_read: None,
        }
    }

    pub fn with_timing(mut self, timing: LinkTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Time of the last successful read, if any.
    pub fn last_read(&self) -> Option<Instant> {
        self.last_read
    }

    /// Open the port unless it is already open.
    pub fn connect(&mut self) -> Result<(), SensorError> {
        if self.state.is_connected() {
            return Ok(());
        }

        match self.connector.open(&self.settings) {
            Ok(transport) => {
                info!(
                    port = %self.settings.path,
                    baud = self.settings.baud_rate,
                    "Omron sensor connected successfully."
                );
                self.state = LinkState::Connected(transport);
                Ok(())
            }
            Err(source) => {
                error!(port = %self.settings.path, "Failed to connect to Omron sensor: {}", source);
                Err(SensorError::TransportUnavailable {
                    port: self.settings.path.clone(),
                    source,
                })
            }
        }
    }

    /// Request and decode the latest measurement block.
    pub fn get_reading(&mut self) -> Result<Reading, SensorError> {
        self.connect()?;
        self.wait_for_read_slot();

        let transport = match &mut self.state {
            LinkState::Connected(transport) => transport,
            LinkState::Disconnected => {
                return Err(SensorError::TransportUnavailable {
                    port: self.settings.path.clone(),
                    source: io::Error::from(ErrorKind::NotConnected),
                });
            }
        };

        let command = Command::read_latest_data().to_bytes();
        let mut frame = [0u8; RESPONSE_FRAME_SIZE];
        let exchanged = exchange(
            transport,
            &command,
            &mut frame,
            self.timing.settle_delay,
            self.settings.read_timeout,
        );

        let received = match exchanged {
            Ok(received) => received,
            Err(e) => {
                warn!("Serial communication error: {}; dropping connection", e);
                self.state = LinkState::Disconnected;
                return Err(SensorError::TransportError(e));
            }
        };

        if received != RESPONSE_FRAME_SIZE {
            error!("Received incorrect data length: {} bytes", received);
            return Err(SensorError::IncompleteFrame {
                expected: RESPONSE_FRAME_SIZE,
                actual: received,
            });
        }

        let raw = LatestDataRaw::parse(&frame)?;
        let code = raw.command_code();
        if code.is_error() {
            debug!(command = ?code, address = ?raw.address(), "Sensor flagged the response as an error");
        }
        if !raw.crc_valid() {
            debug!(crc = raw.crc.get(), "Response checksum does not match");
        }
        let reading = Reading::from(*raw);

        self.last_read = Some(Instant::now());
        debug!(sequence = raw.sequence, "{}", reading);
        Ok(reading)
    }

    /// Close the port if it is open. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        if let LinkState::Connected(transport) = std::mem::replace(&mut self.state, LinkState::Disconnected) {
            drop(transport);
            info!(port = %self.settings.path, "Serial port closed.");
        }
    }

    fn wait_for_read_slot(&self) {
        let Some(last) = self.last_read else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed < self.timing.min_read_interval {
            let remaining = self.timing.min_read_interval - elapsed;
            debug!(wait_ms = remaining.as_millis() as u64, "Rate limiting sensor read");
            thread::sleep(remaining);
        }
    }
}

impl<C: Connector> Drop for SensorLink<C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Flush, send `command`, wait `settle`, then fill as much of `frame` as
/// arrives within `timeout`. Returns the number of bytes received.
fn exchange<T: Transport>(
    transport: &mut T,
    command: &[u8],
    frame: &mut [u8],
    settle: Duration,
    timeout: Duration,
) -> io::Result<usize> {
    transport.clear_input()?;

    debug!(bytes = hex::encode(command), "Serial Write");
    transport.write_all(command)?;
    transport.flush()?;

    thread::sleep(settle);

    let received = read_with_timeout(transport, frame, timeout)?;
    debug!(bytes = hex::encode(&frame[..received]), "Serial Read");
    Ok(received)
}

fn read_with_timeout<T: Transport>(transport: &mut T, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;

    while filled < buf.len() {
        match transport.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
            Err(e) => return Err(e),
        }
        if Instant::now() >= deadline {
            break;
        }
    }

    Ok(filled)
}
