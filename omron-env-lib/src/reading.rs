use crate::constants::{CRC_SIZE, RESPONSE_FRAME_SIZE};
use crate::crc::crc16;
use crate::error::SensorError;
use crate::packet::{Address, CommandCode};
use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Wire layout of the 56-byte "latest data long" response.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct LatestDataRaw {
    pub header: [u8; 2],
    pub length: U16,
    pub command: u8,
    pub address: U16,
    pub sequence: u8,
    pub temperature_raw: U16, // 0.01 °C, two's complement
    pub humidity_raw: U16,    // 0.01 %RH
    pub light_raw: U16,       // 1 lx
    pub pressure_raw: U32,    // 0.001 hPa
    pub noise_raw: U16,       // 0.01 dB
    pub etvoc_raw: U16,       // 1 ppb
    pub eco2_raw: U16,        // 1 ppm
    pub reserved: [u8; 30],
    pub crc: U16,
}

impl LatestDataRaw {
    /// View a full-length frame without copying.
    pub fn parse(bytes: &[u8]) -> Result<&Self, SensorError> {
        if bytes.len() != RESPONSE_FRAME_SIZE {
            return Err(SensorError::IncompleteFrame {
                expected: RESPONSE_FRAME_SIZE,
                actual: bytes.len(),
            });
        }
        Self::ref_from_bytes(bytes)
            .map_err(|_| SensorError::DecodeError("Failed to map response frame layout".to_string()))
    }

    pub fn command_code(&self) -> CommandCode {
        CommandCode::from_primitive(self.command)
    }

    pub fn address(&self) -> Address {
        Address::from_primitive(self.address.get())
    }

    /// Whether the trailing checksum matches the rest of the frame.
    ///
    /// Diagnostic only; readings are decoded regardless of the result.
    pub fn crc_valid(&self) -> bool {
        let bytes = self.as_bytes();
        crc16(&bytes[..RESPONSE_FRAME_SIZE - CRC_SIZE]) == self.crc.get()
    }
}

/// Sign-extend a 16-bit two's complement field.
pub fn sign_extend_16(value: u16) -> i32 {
    -((value & 0x8000) as i32) | (value & 0x7FFF) as i32
}

/// One decoded measurement set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_c: f64, // Degrees Celsius
    pub humidity_pct: f64,  // Relative humidity in percent
    /// Illuminance as reported by the sensor, without scaling.
    pub light: u16,
    pub pressure_hpa: f64, // Barometric pressure in hectopascal
    pub noise_db: f64,     // Sound pressure level in decibel
    pub co2_ppm: u16,      // Equivalent CO2 in ppm
}

impl From<LatestDataRaw> for Reading {
    fn from(raw: LatestDataRaw) -> Self {
        let temperature_c = sign_extend_16(raw.temperature_raw.get()) as f64 / 100.0;
        let humidity_pct = raw.humidity_raw.get() as f64 / 100.0;
        let pressure_hpa = raw.pressure_raw.get() as f64 / 1000.0;
        let noise_db = raw.noise_raw.get() as f64 / 100.0;

        Reading {
            temperature_c,
            humidity_pct,
            light: raw.light_raw.get(),
            pressure_hpa,
            noise_db,
            co2_ppm: raw.eco2_raw.get(),
        }
    }
}

impl TryFrom<&[u8]> for Reading {
    type Error = SensorError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw = LatestDataRaw::parse(bytes)?;
        Ok(Reading::from(*raw))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temp: {:.2} °C, Humidity: {:.2} %, Light: {} lx, Pressure: {:.3} hPa, Noise: {:.2} dB, CO2: {} ppm",
            self.temperature_c, self.humidity_pct, self.light, self.pressure_hpa, self.noise_db, self.co2_ppm
        )
    }
}
