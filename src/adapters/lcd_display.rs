//! Character LCD adapter — implements [`DisplayPort`] on top of the
//! HD44780/PCF8574 driver.
//!
//! Rows are overwritten in place and padded with spaces instead of issuing
//! a clear, so redraws every 250 ms do not flicker.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::drivers::lcd::Lcd;
use crate::error::Result;

pub struct LcdDisplay<I, D> {
    lcd: Lcd<I, D>,
    /// A bus failure has been logged and not yet recovered from.
    faulted: bool,
}

impl<I: I2c, D: DelayNs> LcdDisplay<I, D> {
    pub fn new(lcd: Lcd<I, D>) -> Self {
        Self { lcd, faulted: false }
    }

    fn draw(&mut self, lines: &[&str]) -> Result<()> {
        let cols = usize::from(self.lcd.cols());
        for row in 0..self.lcd.rows() {
            let text = lines.get(usize::from(row)).copied().unwrap_or("");
            self.lcd.set_cursor(0, row)?;
            let mut written = 0;
            for (i, c) in text.char_indices() {
                if written == cols {
                    break;
                }
                self.lcd.write_str(&text[i..i + c.len_utf8()])?;
                written += 1;
            }
            for _ in written..cols {
                self.lcd.write_str(" ")?;
            }
        }
        Ok(())
    }

    pub fn release(self) -> Lcd<I, D> {
        self.lcd
    }
}

impl<I: I2c, D: DelayNs> DisplayPort for LcdDisplay<I, D> {
    fn show(&mut self, lines: &[&str]) {
        match self.draw(lines) {
            Ok(()) => self.faulted = false,
            Err(e) => {
                if !self.faulted {
                    warn!("LCD write failed: {}", e);
                }
                self.faulted = true;
            }
        }
    }
}
