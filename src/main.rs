//! HazardWatch Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LcdDisplay     HttpReporter   LogEventSink │
//! │  (Sensor+Motion)    (Display)      (Report+WiFi)  (EventSink)  │
//! │  Watchdog           Esp32TimeAdapter                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Calibration · Gas model · Alarm · Schedulers          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{info, warn};

use hazardwatch::adapters::hardware::HardwareAdapter;
use hazardwatch::adapters::http_report::HttpReporter;
use hazardwatch::adapters::lcd_display::LcdDisplay;
use hazardwatch::adapters::log_sink::LogEventSink;
use hazardwatch::adapters::time::Esp32TimeAdapter;
use hazardwatch::adapters::wifi::{ConnectivityPort, WifiAdapter};
use hazardwatch::app::ports::DisplayPort;
use hazardwatch::app::service::AppService;
use hazardwatch::config::{Overrides, SystemConfig};
use hazardwatch::display;
use hazardwatch::drivers::lcd::Lcd;
use hazardwatch::drivers::mpu6050::Mpu6050;
use hazardwatch::drivers::watchdog::Watchdog;
use hazardwatch::drivers::hw_init;
use hazardwatch::error::Error;
use hazardwatch::pins;

/// Idle time between control cycles; lets the IDLE task run.
const LOOP_PERIOD_MS: u32 = 20;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  HazardWatch v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::resolve(&Overrides::from_build_env());
    info!(
        "Config: {} channel(s), endpoint {}, report every {}/{} ms",
        config.channels.len(),
        config.network.endpoint,
        config.report.alarm_interval_ms,
        config.report.calm_interval_ms
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let peripherals = Peripherals::take()?;
    let lcd_bus = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::LCD_I2C_FREQ_HZ)),
    )?;
    let mpu_bus = I2cDriver::new(
        peripherals.i2c1,
        peripherals.pins.gpio19,
        peripherals.pins.gpio18,
        &I2cConfig::new().baudrate(Hertz(pins::MPU_I2C_FREQ_HZ)),
    )?;

    let mut lcd = Lcd::new(
        lcd_bus,
        Delay::new_default(),
        pins::LCD_I2C_ADDR,
        config.display.cols,
        config.display.rows,
    );
    if let Err(e) = lcd.init() {
        warn!("LCD init failed ({}), continuing without display", e);
    }
    let mut screen = LcdDisplay::new(lcd);
    screen.show(&display::render_message("SYSTEM STARTING", "Wi-Fi Connecting", &config.display).lines());

    let mut hw = HardwareAdapter::with_accelerometer(Mpu6050::new(mpu_bus, pins::MPU_I2C_ADDR));
    let mut delay = Delay::new_default();

    // ── 4. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::with_driver(
        &config.network,
        EspWifi::new(peripherals.modem, sysloop, Some(nvs))?,
    );
    match wifi.set_credentials(&config.network.ssid, &config.network.password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi: initial connect failed ({}), will retry", e);
            }
            wifi.wait_for_link(config.network.connect_wait_ms, &mut delay);
        }
        Err(e) => warn!("WiFi: credentials rejected ({}), running offline", e),
    }
    let mut reporter = HttpReporter::new(&config.network, wifi);

    // ── 5. Calibration + app service ──────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = AppService::start(config, &mut hw, &mut delay, &mut screen, &mut sink);

    // Subscribed only now: calibration blocks longer than the timeout.
    let mut watchdog = Watchdog::new();
    let clock = Esp32TimeAdapter::new();

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        reporter.wifi_mut().poll(now_ms);
        app.tick(now_ms, &mut hw, &mut delay, &mut screen, &mut reporter, &mut watchdog, &mut sink);
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
