//! TI ADS1115 16-bit I2C ADC in single-shot mode.
//!
//! Each conversion writes the config register with the OS bit set, waits
//! one conversion period and reads the signed 16-bit result.
//!
//! | Field     | Value              |
//! |-----------|--------------------|
//! | MUX       | AINx vs GND        |
//! | PGA       | ±4.096 V           |
//! | MODE      | single-shot        |
//! | DR        | 128 SPS (~8 ms)    |
//! | COMP_QUE  | comparator off     |

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

use super::moisture::RawAdc;

/// Default 7-bit address (ADDR pin to GND).
pub const DEFAULT_ADDRESS: u8 = 0x48;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

const OS_SINGLE: u16 = 1 << 15;
const PGA_4_096V: u16 = 0b001 << 9;
const MODE_SINGLE_SHOT: u16 = 1 << 8;
const DR_128SPS: u16 = 0b100 << 5;
const COMP_DISABLE: u16 = 0b11;

/// Conversion time at 128 SPS plus margin.
const CONVERSION_DELAY_MS: u32 = 9;

pub struct Ads1115<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    channel: u8,
}

impl<I2C: I2c, D: DelayNs> Ads1115<I2C, D> {
    /// `channel` is the single-ended input (0..=3).
    pub fn new(i2c: I2C, delay: D, address: u8, channel: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            channel: channel & 0x03,
        }
    }

    /// Config register value that starts one conversion on `channel`.
    pub fn config_word(&self) -> u16 {
        let mux = (0b100 | u16::from(self.channel)) << 12;
        OS_SINGLE | mux | PGA_4_096V | MODE_SINGLE_SHOT | DR_128SPS | COMP_DISABLE
    }

    /// Start a conversion and read the signed result.
    pub fn read_single(&mut self) -> Result<i16, SensorError> {
        let [hi, lo] = self.config_word().to_be_bytes();
        self.i2c
            .write(self.address, &[REG_CONFIG, hi, lo])
            .map_err(|_| SensorError::BusError)?;
        self.delay.delay_ms(CONVERSION_DELAY_MS);

        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONVERSION], &mut buf)
            .map_err(|_| SensorError::BusError)?;
        Ok(i16::from_be_bytes(buf))
    }
}

impl<I2C, D> RawAdc for Ads1115<I2C, D>
where
    I2C: I2c + Send,
    D: DelayNs + Send,
{
    fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.read_single().map(i32::from)
    }
}
