// Protocol constants for the Omron 2JCIE-BU01 serial interface

use std::time::Duration;

/// Frame header, "RB" on the wire
pub const FRAME_HEADER: [u8; 2] = [0x52, 0x42];

/// Size of the trailing CRC-16 (2 bytes)
pub const CRC_SIZE: usize = 2;

/// Size of the "read latest data long" command frame, CRC included (9 bytes)
pub const READ_COMMAND_SIZE: usize = 9;

/// Size of the "latest data long" response frame (56 bytes)
pub const RESPONSE_FRAME_SIZE: usize = 56;

/// Default serial baud rate of the sensor
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default serial read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Minimum spacing between two successful reads
pub const MIN_READ_INTERVAL: Duration = Duration::from_secs(1);

/// Wait between writing a command and reading the reply
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
