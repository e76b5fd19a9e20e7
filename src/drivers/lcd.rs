//! HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The backpack exposes the controller's 4-bit bus on one 8-bit port:
//!
//! ```text
//!   P7 P6 P5 P4 │ P3 │ P2 │ P1 │ P0
//!   D7 D6 D5 D4 │ BL │ EN │ RW │ RS
//! ```
//!
//! Every byte is sent as two nibbles, each latched by pulsing EN.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{DisplayError, Result};

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

pub struct Lcd<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    cols: u8,
    rows: u8,
    backlight: bool,
}

impl<I: I2c, D: DelayNs> Lcd<I, D> {
    pub fn new(i2c: I, delay: D, address: u8, cols: u8, rows: u8) -> Self {
        Self { i2c, delay, address, cols, rows, backlight: true }
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Power-on reset into 4-bit mode, display on, cursor off.
    pub fn init(&mut self) -> Result<()> {
        self.delay.delay_ms(50);
        // Three 8-bit "function set" nibbles re-sync the controller from any state.
        for wait_us in [4_500, 4_500, 150] {
            self.write_nibble(0x03 << 4, 0)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x02 << 4, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_LEFT)?;
        log::info!("lcd: {}x{} ready at 0x{:02X}", self.cols, self.rows, self.address);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Move the cursor; out-of-range positions are clamped.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        let row = row.min(self.rows.saturating_sub(1));
        let col = col.min(self.cols.saturating_sub(1));
        // Rows 2 and 3 continue rows 0 and 1 in DDRAM.
        let offset = match row {
            0 => 0x00,
            1 => 0x40,
            2 => self.cols,
            _ => 0x40 + self.cols,
        };
        self.command(CMD_SET_DDRAM | (offset + col))
    }

    /// Write text at the cursor.  Non-ASCII characters print as `?`.
    pub fn write_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.send(byte, RS)?;
        }
        Ok(())
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.backlight = on;
        self.expander_write(0)
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<()> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, high_nibble: u8, mode: u8) -> Result<()> {
        self.expander_write(high_nibble | mode | EN)?;
        self.delay.delay_us(1);
        self.expander_write(high_nibble | mode)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, bits: u8) -> Result<()> {
        let bl = if self.backlight { BACKLIGHT } else { 0 };
        self.i2c
            .write(self.address, &[bits | bl])
            .map_err(|_| DisplayError::BusFailed.into())
    }
}
