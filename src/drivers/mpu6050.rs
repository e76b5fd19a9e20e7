//! Minimal MPU-6050 driver: wake-up, raw acceleration and die temperature.
//!
//! Generic over any `embedded_hal::i2c::I2c` bus so host tests can drive it
//! with a register-map fake.  Full-scale range is left at the power-on
//! default (±2 g, 16384 LSB/g).

use embedded_hal::i2c::I2c;

use crate::error::{Result, SensorError};

const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_TEMP_OUT_H: u8 = 0x41;
const REG_WHO_AM_I: u8 = 0x75;

/// Expected `WHO_AM_I` value.
pub const DEVICE_ID: u8 = 0x68;

pub struct Mpu6050<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Mpu6050<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Check the part identity, then clear the sleep bit and select the
    /// internal oscillator.
    pub fn init(&mut self) -> Result<()> {
        let id = self.who_am_i()?;
        if id != DEVICE_ID {
            return Err(SensorError::WrongDevice(id).into());
        }
        self.write_reg(REG_PWR_MGMT_1, 0x00)?;
        log::info!("mpu6050: awake at 0x{:02X}", self.address);
        Ok(())
    }

    pub fn who_am_i(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_into(REG_WHO_AM_I, &mut buf)?;
        Ok(buf[0])
    }

    /// Signed raw X, Y, Z counts.
    pub fn read_accel(&mut self) -> Result<[i16; 3]> {
        let mut buf = [0u8; 6];
        self.read_into(REG_ACCEL_XOUT_H, &mut buf)?;
        Ok([
            i16::from_be_bytes([buf[0], buf[1]]),
            i16::from_be_bytes([buf[2], buf[3]]),
            i16::from_be_bytes([buf[4], buf[5]]),
        ])
    }

    /// Die temperature in °C (`raw / 340 + 36.53`).
    pub fn read_temperature(&mut self) -> Result<f32> {
        let mut buf = [0u8; 2];
        self.read_into(REG_TEMP_OUT_H, &mut buf)?;
        Ok(raw_to_celsius(i16::from_be_bytes(buf)))
    }

    /// Release the underlying I2C bus.
    pub fn release(self) -> I {
        self.i2c
    }

    fn read_into(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::BusFailed.into())
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::BusFailed.into())
    }
}

pub fn raw_to_celsius(raw: i16) -> f32 {
    f32::from(raw) / 340.0 + 36.53
}
