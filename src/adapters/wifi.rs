//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.  Association is started without blocking; the link state
//! is re-checked on a fixed interval from the main loop.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! Every `link_check_interval_ms` (default 10 s) [`poll`](ConnectivityPort::poll)
//! refreshes the cached link flag and, when the link is down, starts a new
//! association attempt.  The interval is fixed: there is no backoff.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::NetworkConfig;
use crate::scheduler::interval_elapsed;

#[cfg(target_os = "espidf")]
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::EspWifi;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

pub trait ConnectivityPort {
    /// Start associating with the configured AP.  Does not wait for the link.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    /// Cached link flag, refreshed by [`poll`](Self::poll).
    fn is_connected(&self) -> bool;
    /// Periodic link check at monotonic time `now_ms`.
    fn poll(&mut self, now_ms: u64);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

/// Simulation: driver calls in the order they were made.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimOp {
    Connect,
    Disconnect,
}

/// Poll period of the startup link wait.
const LINK_WAIT_STEP_MS: u32 = 100;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    link_check_interval_ms: u32,
    last_check_ms: u64,
    last_rssi: Option<i8>,
    #[cfg(target_os = "espidf")]
    wifi: Option<EspWifi<'static>>,
    /// Simulation: whether the access point is reachable.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_reachable: bool,
    /// Simulation: association completed.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_ops: std::vec::Vec<SimOp>,
}

impl WifiAdapter {
    pub fn new(cfg: &NetworkConfig) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            link_check_interval_ms: cfg.link_check_interval_ms,
            last_check_ms: 0,
            last_rssi: None,
            #[cfg(target_os = "espidf")]
            wifi: None,
            #[cfg(not(target_os = "espidf"))]
            sim_ap_reachable: true,
            #[cfg(not(target_os = "espidf"))]
            sim_associated: false,
            #[cfg(not(target_os = "espidf"))]
            sim_ops: std::vec::Vec::new(),
        }
    }

    /// Attach the ESP-IDF driver (taken from the modem peripheral in `main`).
    #[cfg(target_os = "espidf")]
    pub fn with_driver(cfg: &NetworkConfig, wifi: EspWifi<'static>) -> Self {
        let mut adapter = Self::new(cfg);
        adapter.wifi = Some(wifi);
        adapter
    }

    /// Simulation: make the access point (un)reachable.  Dropping it also
    /// drops an established association.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap_reachable(&mut self, reachable: bool) {
        self.sim_ap_reachable = reachable;
        if !reachable {
            self.sim_associated = false;
        }
    }

    /// Simulation: every driver call made so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_ops(&self) -> &[SimOp] {
        &self.sim_ops
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Block for up to `wait_ms` until the link comes up.  Used once at
    /// boot so the first report can go out; the loop never calls it.
    pub fn wait_for_link(&mut self, wait_ms: u32, delay: &mut impl DelayNs) -> bool {
        let mut waited = 0;
        loop {
            if self.platform_link_up() {
                self.mark_connected();
                return true;
            }
            if waited >= wait_ms {
                warn!("WiFi: no link after {} ms, continuing offline", wait_ms);
                return false;
            }
            delay.delay_ms(LINK_WAIT_STEP_MS);
            waited += LINK_WAIT_STEP_MS;
        }
    }

    fn mark_connected(&mut self) {
        if self.state != WifiState::Connected {
            self.state = WifiState::Connected;
            self.last_rssi = self.platform_rssi();
            info!("WiFi: connected to '{}' (RSSI={:?})", self.ssid, self.last_rssi);
        }
    }

    fn retry(&mut self, attempt: u32) {
        self.state = WifiState::Reconnecting { attempt };
        info!("WiFi: reconnect attempt {}", attempt);
        // A half-finished association blocks a fresh connect.
        self.platform_disconnect();
        if let Err(e) = self.platform_connect() {
            warn!("WiFi: reconnect attempt {} failed: {}", attempt, e);
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let wifi = self.wifi.as_mut().ok_or(ConnectivityError::ConnectionFailed)?;
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self.password.as_str().try_into().map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&conf).map_err(|e| {
            warn!("WiFi: set_configuration failed: {:?}", e);
            ConnectivityError::ConnectionFailed
        })?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|e| {
                warn!("WiFi: start failed: {:?}", e);
                ConnectivityError::ConnectionFailed
            })?;
        }
        wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {:?}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_ops.push(SimOp::Connect);
        if !self.sim_ap_reachable {
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_associated = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.wifi.as_mut() {
            // ESP_ERR_WIFI_NOT_CONNECT is the usual answer here.
            if let Err(e) = wifi.disconnect() {
                log::debug!("WiFi: disconnect: {:?}", e);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_ops.push(SimOp::Disconnect);
        self.sim_associated = false;
    }

    /// Associated and the netif has an address.
    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.wifi.as_ref().is_some_and(|w| w.is_up().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_associated && self.sim_ap_reachable
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
        // SAFETY: ap_info is a valid, writable record; the driver is started.
        let ret = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (ret == esp_idf_svc::sys::ESP_OK).then_some(ap_info.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        self.platform_link_up().then_some(-60)
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connecting;
                Ok(())
            }
            Err(e) => {
                warn!("WiFi: connection failed: {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        self.last_rssi = None;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    fn poll(&mut self, now_ms: u64) {
        if !interval_elapsed(now_ms, self.last_check_ms, self.link_check_interval_ms) {
            return;
        }
        self.last_check_ms = now_ms;

        let up = self.platform_link_up();
        match self.state {
            WifiState::Disconnected => {}
            WifiState::Connected if up => self.last_rssi = self.platform_rssi(),
            WifiState::Connected => {
                warn!("WiFi: connection lost, reconnecting");
                self.last_rssi = None;
                self.retry(0);
            }
            WifiState::Connecting | WifiState::Reconnecting { .. } if up => self.mark_connected(),
            WifiState::Connecting => self.retry(0),
            WifiState::Reconnecting { attempt } => self.retry(attempt + 1),
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    fn rssi(&self) -> Option<i8> {
        self.last_rssi
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn adapter() -> WifiAdapter {
        WifiAdapter::new(&NetworkConfig::default())
    }

    fn online() -> WifiAdapter {
        let mut a = adapter();
        a.set_credentials("TestNet", "password1").unwrap();
        a.connect().unwrap();
        assert!(a.wait_for_link(3_000, &mut NoDelay));
        a
    }

    #[test]
    fn rejects_empty_ssid() {
        let mut a = adapter();
        assert_eq!(a.set_credentials("", "password123"), Err(ConnectivityError::InvalidSsid));
    }

    #[test]
    fn rejects_short_password() {
        let mut a = adapter();
        assert_eq!(a.set_credentials("MyNet", "short"), Err(ConnectivityError::InvalidPassword));
    }

    #[test]
    fn accepts_open_network() {
        let mut a = adapter();
        assert!(a.set_credentials("OpenCafe", "").is_ok());
    }

    #[test]
    fn connect_without_credentials_fails() {
        let mut a = adapter();
        assert_eq!(a.connect(), Err(ConnectivityError::NoCredentials));
    }

    #[test]
    fn connect_is_not_online_until_link_check() {
        let mut a = adapter();
        a.set_credentials("TestNet", "password1").unwrap();
        a.connect().unwrap();
        assert_eq!(a.state(), WifiState::Connecting);
        assert!(!a.is_connected());
        a.poll(10_000);
        assert!(a.is_connected());
        assert!(a.rssi().is_some());
    }

    #[test]
    fn startup_wait_gives_up_when_unreachable() {
        let mut a = adapter();
        a.sim_set_ap_reachable(false);
        a.set_credentials("TestNet", "password1").unwrap();
        assert_eq!(a.connect(), Err(ConnectivityError::ConnectionFailed));
        assert!(!a.wait_for_link(3_000, &mut NoDelay));
        assert!(!a.is_connected());
    }

    #[test]
    fn link_loss_is_noticed_only_on_interval() {
        let mut a = online();
        a.sim_set_ap_reachable(false);
        a.poll(5_000);
        assert!(a.is_connected(), "checked before the interval elapsed");
        a.poll(10_000);
        assert!(!a.is_connected());
        assert_eq!(a.state(), WifiState::Reconnecting { attempt: 0 });
        a.poll(20_000);
        assert_eq!(a.state(), WifiState::Reconnecting { attempt: 1 });
    }

    #[test]
    fn retry_resets_station_before_connecting() {
        let mut a = online();
        let before = a.sim_ops().len();
        a.sim_set_ap_reachable(false);
        a.poll(10_000);
        a.poll(20_000);
        assert_eq!(
            &a.sim_ops()[before..],
            &[SimOp::Disconnect, SimOp::Connect, SimOp::Disconnect, SimOp::Connect]
        );
    }

    #[test]
    fn recovers_after_ap_returns() {
        let mut a = online();
        a.sim_set_ap_reachable(false);
        a.poll(10_000);
        a.sim_set_ap_reachable(true);
        a.poll(20_000); // retry associates
        a.poll(30_000); // link check sees it
        assert!(a.is_connected());
    }

    #[test]
    fn double_connect_fails() {
        let mut a = online();
        assert_eq!(a.connect(), Err(ConnectivityError::AlreadyConnected));
        a.disconnect();
        assert!(!a.is_connected());
        assert!(a.rssi().is_none());
    }
}
