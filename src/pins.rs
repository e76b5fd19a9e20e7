//! GPIO / peripheral pin assignments for the HazardWatch main board (ESP32).
//!
//! Single source of truth: drivers and the hardware adapter reference this
//! module rather than hard-coding pin numbers.

use crate::sensors::channel::ChannelId;

// ---------------------------------------------------------------------------
// Gas sensors: analog outputs (ADC1; ADC2 is unusable while Wi-Fi is up)
// ---------------------------------------------------------------------------

/// MQ-6 LPG sensor analog output (ADC1 channel 6).
pub const MQ6_AO_GPIO: i32 = 34;
/// MQ-9 combustible gas sensor analog output (ADC1 channel 5).
pub const MQ9_AO_GPIO: i32 = 33;
/// MQ-7 CO sensor analog output (ADC1 channel 4).
pub const MQ7_AO_GPIO: i32 = 32;

pub const MQ6_ADC_CHANNEL: u32 = 6;
pub const MQ9_ADC_CHANNEL: u32 = 5;
pub const MQ7_ADC_CHANNEL: u32 = 4;

// ---------------------------------------------------------------------------
// Digital threshold outputs (comparator on each sensor module)
// ---------------------------------------------------------------------------

pub const MQ6_DO_GPIO: i32 = 25;
pub const MQ9_DO_GPIO: i32 = 14;
pub const MQ7_DO_GPIO: i32 = 27;

/// Flame sensor comparator output.
pub const FIRE_DO_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// I²C buses
// ---------------------------------------------------------------------------

/// Bus 0: character LCD with PCF8574 backpack.
pub const LCD_SDA_GPIO: i32 = 21;
pub const LCD_SCL_GPIO: i32 = 22;
pub const LCD_I2C_ADDR: u8 = 0x27;
pub const LCD_I2C_FREQ_HZ: u32 = 100_000;

/// Bus 1: MPU-6050 accelerometer.
pub const MPU_SDA_GPIO: i32 = 19;
pub const MPU_SCL_GPIO: i32 = 18;
pub const MPU_I2C_ADDR: u8 = 0x68;
pub const MPU_I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Channel wiring lookup
// ---------------------------------------------------------------------------

/// ADC1 channel carrying the analog output of `id`.
pub const fn adc_channel(id: ChannelId) -> u32 {
    match id {
        ChannelId::Lpg => MQ6_ADC_CHANNEL,
        ChannelId::Combustible => MQ9_ADC_CHANNEL,
        ChannelId::Co => MQ7_ADC_CHANNEL,
    }
}

/// GPIO carrying the digital threshold output of `id`.
pub const fn threshold_gpio(id: ChannelId) -> i32 {
    match id {
        ChannelId::Lpg => MQ6_DO_GPIO,
        ChannelId::Combustible => MQ9_DO_GPIO,
        ChannelId::Co => MQ7_DO_GPIO,
    }
}

/// Every digital input that `hw_init` configures.
pub const DIGITAL_INPUTS: [i32; 4] = [MQ6_DO_GPIO, MQ9_DO_GPIO, MQ7_DO_GPIO, FIRE_DO_GPIO];

/// Every ADC1 channel that `hw_init` configures.
pub const ADC_CHANNELS: [u32; 3] = [MQ6_ADC_CHANNEL, MQ9_ADC_CHANNEL, MQ7_ADC_CHANNEL];
