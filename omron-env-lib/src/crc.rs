//! CRC-16/MODBUS as implemented by the sensor firmware.
//!
//! Initial value `0xFFFF`, reflected polynomial `0xA001`, no final XOR.
//! On the wire the checksum is sent low byte first.

const CRC_INIT: u16 = 0xFFFF;
const CRC_POLY: u16 = 0xA001;

/// Compute the checksum over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = CRC_INIT;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ CRC_POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Checksum of `data` in wire order.
pub fn crc16_le_bytes(data: &[u8]) -> [u8; 2] {
    crc16(data).to_le_bytes()
}
