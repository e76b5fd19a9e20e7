//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                   |
//! |----------------|--------------------|-------------------------------|
//! | `hardware`     | SensorPort         | ESP32 ADC1, comparator GPIOs  |
//! |                | MotionPort         | MPU-6050 over I²C             |
//! | `lcd_display`  | DisplayPort        | HD44780 + PCF8574 over I²C    |
//! | `http_report`  | ReportPort         | HTTP(S) POST endpoint         |
//! | `log_sink`     | EventSink          | Serial log output             |
//! | `time`         | —                  | ESP32 system timer            |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA              |
//!
//! The watchdog driver implements `WatchdogPort` directly.

pub mod hardware;
pub mod http_report;
pub mod lcd_display;
pub mod log_sink;
pub mod time;
pub mod wifi;
