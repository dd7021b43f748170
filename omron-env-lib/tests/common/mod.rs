//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use hex;
#[allow(unused_imports)]
pub use omron_env_lib::error::SensorError;
#[allow(unused_imports)]
pub use omron_env_lib::reading::Reading;
#[allow(unused_imports)]
pub use omron_env_lib::{Connector, LinkTiming, PortSettings, SensorLink, Transport};

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Golden response: 25.34 °C, 45.12 %, 321 lx, 1013.25 hPa, 43.21 dB, 612 ppm
#[allow(dead_code)]
pub const GOLDEN_FRAME: &str = "524234000121502ae609a011410102760f00e11007006402000000000000000000000000000000000000000000000000000000000000b15c";

/// The only command the link ever sends
#[allow(dead_code)]
pub const READ_COMMAND: &[u8] = &[0x52, 0x42, 0x05, 0x00, 0x01, 0x21, 0x50, 0xE2, 0x4B];

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

#[allow(dead_code)]
pub fn golden_frame() -> Vec<u8> {
    hex_to_bytes(GOLDEN_FRAME)
}

/// Build a 56-byte frame by writing each raw field at its documented offset.
#[allow(dead_code)]
pub fn frame_with_fields(temperature: u16, humidity: u16, light: u16, pressure: u32, noise: u16, co2: u16) -> Vec<u8> {
    let mut frame = vec![0u8; 56];
    frame[0..8].copy_from_slice(&[0x52, 0x42, 0x34, 0x00, 0x01, 0x21, 0x50, 0x00]);
    frame[8..10].copy_from_slice(&temperature.to_le_bytes());
    frame[10..12].copy_from_slice(&humidity.to_le_bytes());
    frame[12..14].copy_from_slice(&light.to_le_bytes());
    frame[14..18].copy_from_slice(&pressure.to_le_bytes());
    frame[18..20].copy_from_slice(&noise.to_le_bytes());
    frame[22..24].copy_from_slice(&co2.to_le_bytes());
    frame
}

/// Timings short enough to keep the suite fast.
#[allow(dead_code)]
pub fn fast_timing(min_read_interval: Duration) -> LinkTiming {
    LinkTiming {
        min_read_interval,
        settle_delay: Duration::ZERO,
    }
}

#[allow(dead_code)]
pub fn test_settings() -> PortSettings {
    PortSettings::new("/dev/ttyMOCK0").with_read_timeout(Duration::from_millis(50))
}

/// What the mock sensor does when a command is written.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    /// Queue these bytes for reading
    Frame(Vec<u8>),
    /// Never answer; reads time out
    Silence,
    /// Fail the write itself
    WriteFault(ErrorKind),
    /// Accept the write but fail the following read
    ReadFault(ErrorKind),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub replies: VecDeque<Reply>,
    pub input: VecDeque<u8>,
    pub written: Vec<Vec<u8>>,
    pub write_times: Vec<Instant>,
    pub read_fault: Option<ErrorKind>,
    pub clears: usize,
    pub opens: usize,
    pub closes: usize,
    pub failing_opens: usize,
}

/// Scripted stand-in for the sensor's serial port.
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if let Some(kind) = state.read_fault.take() {
            return Err(io::Error::from(kind));
        }
        if state.input.is_empty() {
            return Err(io::Error::from(ErrorKind::TimedOut));
        }
        let n = buf.len().min(state.input.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.input.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        match state.replies.pop_front().unwrap_or(Reply::Silence) {
            Reply::WriteFault(kind) => return Err(io::Error::from(kind)),
            Reply::Frame(bytes) => state.input.extend(bytes),
            Reply::ReadFault(kind) => state.read_fault = Some(kind),
            Reply::Silence => {}
        }
        state.written.push(buf.to_vec());
        state.write_times.push(Instant::now());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn clear_input(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.input.clear();
        state.clears += 1;
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.state.lock().unwrap().closes += 1;
    }
}

/// Hands out [`MockTransport`]s sharing one [`MockState`].
#[derive(Clone, Default)]
pub struct MockConnector {
    pub state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, reply: Reply) -> &Self {
        self.state.lock().unwrap().replies.push_back(reply);
        self
    }

    /// Bytes sitting in the input buffer before any command is sent.
    pub fn preload_input(&self, bytes: &[u8]) {
        self.state.lock().unwrap().input.extend(bytes.iter().copied());
    }

    pub fn fail_next_opens(&self, count: usize) {
        self.state.lock().unwrap().failing_opens = count;
    }

    pub fn snapshot<R>(&self, f: impl FnOnce(&MockState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn open(&self, _settings: &PortSettings) -> io::Result<MockTransport> {
        let mut state = self.state.lock().unwrap();
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(io::Error::new(ErrorKind::NotFound, "No such file or directory"));
        }
        state.opens += 1;
        Ok(MockTransport {
            state: Arc::clone(&self.state),
        })
    }
}

#[allow(dead_code)]
pub fn mock_link(connector: &MockConnector, min_read_interval: Duration) -> SensorLink<MockConnector> {
    SensorLink::with_connector(test_settings(), connector.clone()).with_timing(fast_timing(min_read_interval))
}
