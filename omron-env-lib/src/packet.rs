use crate::constants::{CRC_SIZE, FRAME_HEADER};
use crate::crc::crc16_le_bytes;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};

/// Command codes carried in byte 4 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    Read = 0x01,
    Write = 0x02,
    // The sensor sets the high bit when it rejects a command
    ReadError = 0x81,
    WriteError = 0x82,

    #[num_enum(catch_all)]
    Unknown(u8),
}

impl CommandCode {
    pub fn is_error(&self) -> bool {
        let value: u8 = (*self).into();
        value & 0x80 != 0
    }
}

/// Register addresses, sent little-endian after the command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u16)]
pub enum Address {
    LatestDataLong = 0x5021,
    LatestDataShort = 0x5022,

    #[num_enum(catch_all)]
    Unknown(u16),
}

/// An outbound request frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub code: CommandCode,
    pub address: Address,
    pub data: Bytes,
}

impl Command {
    pub fn read(address: Address) -> Self {
        Self {
            code: CommandCode::Read,
            address,
            data: Bytes::new(),
        }
    }

    /// The request for the latest long-form measurement block.
    pub fn read_latest_data() -> Self {
        Self::read(Address::LatestDataLong)
    }

    /// Header, length, command, address and data, without the checksum.
    pub fn body(&self) -> Bytes {
        // The length field counts everything after itself, checksum included
        let length = (1 + 2 + self.data.len() + CRC_SIZE) as u16;

        let mut body = BytesMut::with_capacity(7 + self.data.len());
        body.extend_from_slice(&FRAME_HEADER);
        body.put_u16_le(length);
        body.put_u8(self.code.into());
        body.put_u16_le(self.address.into());
        body.extend_from_slice(&self.data);
        body.freeze()
    }

    /// The complete frame as written to the port.
    pub fn to_bytes(&self) -> Bytes {
        let body = self.body();
        let mut frame = BytesMut::with_capacity(body.len() + CRC_SIZE);
        frame.extend_from_slice(&body);
        frame.extend_from_slice(&crc16_le_bytes(&body));
        frame.freeze()
    }
}
