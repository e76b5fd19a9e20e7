//! System configuration parameters
//!
//! All tunable parameters for the HazardWatch system.  Defaults are the
//! compile-time constants; a JSON document can replace them at startup
//! ([`SystemConfig::from_json`]).  Every config is validated before use.

use heapless::{String, Vec};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::sensors::channel::{ChannelId, MAX_CHANNELS, Polarity};

/// Widest supported character display.
pub const MAX_DISPLAY_COLS: u8 = 20;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub network: NetworkConfig,
    pub sampler: SamplerConfig,
    pub calibration: CalibrationConfig,
    /// Monitored gas channels, in display / calibration order.
    pub channels: Vec<ChannelConfig, MAX_CHANNELS>,
    /// Polarity of the flame sensor's digital output.
    pub fire_polarity: Polarity,
    /// R_0 temperature/humidity correction; `None` disables it.
    pub compensation: Option<CompensationConfig>,
    pub seismic: SeismicConfig,
    pub report: ReportConfig,
    pub display: DisplayConfig,
}

// --- Network ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: String<32>,
    pub password: String<64>,
    /// `http://` or `https://` URL the status payload is POSTed to.
    pub endpoint: String<128>,
    /// Validate the server certificate on HTTPS endpoints.
    pub verify_tls: bool,
    pub request_timeout_ms: u32,
    /// How often the Wi-Fi link is checked (and restarted when down).
    pub link_check_interval_ms: u32,
    /// Longest boot-time wait for the first association.
    pub connect_wait_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: bounded("HazardWatch"),
            password: String::new(),
            endpoint: bounded("http://example.com/api/data"),
            verify_tls: true,
            request_timeout_ms: 5_000,
            link_check_interval_ms: 10_000,
            connect_wait_ms: 3_000,
        }
    }
}

// --- Sampling ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Raw reads averaged per voltage sample.
    pub samples: u16,
    /// Pause after each raw read (microseconds).
    pub inter_sample_delay_us: u32,
    /// ADC reference voltage.
    pub vref: f32,
    /// Full-scale raw ADC value.
    pub adc_max: u16,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            inter_sample_delay_us: 2_000,
            vref: 3.3,
            adc_max: 4095,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Length of the warm-up window (milliseconds).
    pub duration_ms: u32,
    /// Pause between calibration ticks (milliseconds).
    pub tick_ms: u32,
    /// Raw reads per channel per tick.
    pub samples_per_tick: u16,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            tick_ms: 200,
            samples_per_tick: 1,
        }
    }
}

// --- Gas channels ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: ChannelId,
    /// Rise above the clean-air baseline that trips the alarm (volts).
    pub margin_v: f32,
    pub threshold_polarity: Polarity,
    pub model: GasModelConfig,
}

impl ChannelConfig {
    /// MQ-6 LPG sensor.
    pub fn mq6() -> Self {
        Self::with_curve(ChannelId::Lpg, 1009.2, -2.35)
    }

    /// MQ-9 combustible gas sensor.
    pub fn mq9() -> Self {
        Self::with_curve(ChannelId::Combustible, 1000.5, -2.186)
    }

    /// MQ-7 carbon monoxide sensor.
    pub fn mq7() -> Self {
        Self::with_curve(ChannelId::Co, 99.042, -1.518)
    }

    fn with_curve(id: ChannelId, curve_a: f32, curve_b: f32) -> Self {
        Self {
            id,
            margin_v: 0.8,
            threshold_polarity: Polarity::ActiveLow,
            model: GasModelConfig {
                curve_a,
                curve_b,
                ..GasModelConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasModelConfig {
    /// Divider supply voltage.
    pub vcc: f32,
    /// Load resistor on the sensor module (ohms).
    pub r_load_ohm: f32,
    /// Clean-air sensor resistance measured on the bench (ohms).
    pub r0_ohm: f32,
    pub curve_a: f32,
    /// Curve exponent; must be negative.
    pub curve_b: f32,
    /// Upper clamp for reported concentration.
    pub max_ppm: f32,
    /// Resistance ratio reported as 100 % pollution.
    pub ratio_full_scale: f32,
}

impl Default for GasModelConfig {
    fn default() -> Self {
        Self {
            vcc: 3.3,
            r_load_ohm: 5_000.0,
            r0_ohm: 18_000.0,
            curve_a: 1009.2,
            curve_b: -2.35,
            max_ppm: 10_000.0,
            ratio_full_scale: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompensationConfig {
    /// Fractional R_0 change per °C.
    pub k_t: f32,
    pub t_ref_c: f32,
    /// Fractional R_0 change per %RH.
    pub k_h: f32,
    pub h_ref_pct: f32,
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            k_t: 0.02,
            t_ref_c: 20.0,
            k_h: 0.01,
            h_ref_pct: 65.0,
        }
    }
}

// --- Seismic ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicConfig {
    /// Deltas at or below this are normal vibration (g).
    pub low_g: f32,
    /// Deltas at or above this are sensor glitches (g).  `None` disables
    /// the ceiling.
    pub high_g: Option<f32>,
    /// Accelerometer counts per g (16384 for the ±2 g range).
    pub lsb_per_g: f32,
}

impl Default for SeismicConfig {
    fn default() -> Self {
        Self {
            low_g: 0.5,
            high_g: Some(10.0),
            lsb_per_g: 16_384.0,
        }
    }
}

// --- Timing ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report interval while an alarm is active (milliseconds).
    pub alarm_interval_ms: u32,
    /// Report interval while calm (milliseconds).
    pub calm_interval_ms: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            alarm_interval_ms: 3_000,
            calm_interval_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 2 or 4.
    pub rows: u8,
    pub cols: u8,
    pub alarm_refresh_ms: u32,
    pub calm_refresh_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 16,
            alarm_refresh_ms: 250,
            calm_refresh_ms: 250,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            sampler: SamplerConfig::default(),
            calibration: CalibrationConfig::default(),
            channels: [ChannelConfig::mq6(), ChannelConfig::mq9(), ChannelConfig::mq7()]
                .into_iter()
                .collect(),
            fire_polarity: Polarity::ActiveLow,
            compensation: Some(CompensationConfig::default()),
            seismic: SeismicConfig::default(),
            report: ReportConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use ConfigError::ValidationFailed as Invalid;

        let n = &self.network;
        if !(n.endpoint.starts_with("http://") || n.endpoint.starts_with("https://")) {
            return Err(Invalid("network.endpoint must be an http:// or https:// URL"));
        }
        if n.link_check_interval_ms == 0 {
            return Err(Invalid("network.link_check_interval_ms must be > 0"));
        }

        let s = &self.sampler;
        if s.samples < 5 {
            return Err(Invalid("sampler.samples must be >= 5"));
        }
        if s.adc_max == 0 || !(s.vref > 0.0) {
            return Err(Invalid("sampler.vref and sampler.adc_max must be > 0"));
        }

        let c = &self.calibration;
        if c.tick_ms == 0 || c.duration_ms < c.tick_ms || c.samples_per_tick == 0 {
            return Err(Invalid("calibration window must hold at least one tick"));
        }

        if self.channels.is_empty() {
            return Err(Invalid("at least one gas channel is required"));
        }
        for (i, ch) in self.channels.iter().enumerate() {
            if self.channels[..i].iter().any(|other| other.id == ch.id) {
                return Err(Invalid("channel ids must be unique"));
            }
            if !(ch.margin_v >= 0.0) {
                return Err(Invalid("channel margin_v must be >= 0"));
            }
            let m = &ch.model;
            if !(m.vcc > 0.0 && m.r_load_ohm > 0.0 && m.r0_ohm > 0.0) {
                return Err(Invalid("gas model vcc, r_load and r0 must be > 0"));
            }
            if !(m.curve_b < 0.0) || !(m.curve_a > 0.0) {
                return Err(Invalid("gas model curve needs A > 0 and B < 0"));
            }
            if !(m.max_ppm > 0.0) {
                return Err(Invalid("gas model max_ppm must be > 0"));
            }
        }

        let q = &self.seismic;
        if !(q.low_g >= 0.0) || !(q.lsb_per_g > 0.0) {
            return Err(Invalid("seismic.low_g must be >= 0 and lsb_per_g > 0"));
        }
        if q.high_g.is_some_and(|high| !(high > q.low_g)) {
            return Err(Invalid("seismic.high_g must be above low_g"));
        }

        let r = &self.report;
        if r.alarm_interval_ms == 0 || r.calm_interval_ms == 0 {
            return Err(Invalid("report intervals must be > 0"));
        }

        let d = &self.display;
        if d.rows != 2 && d.rows != 4 {
            return Err(Invalid("display.rows must be 2 or 4"));
        }
        if d.cols < 16 || d.cols > MAX_DISPLAY_COLS {
            return Err(Invalid("display.cols must be 16..=20"));
        }
        if d.alarm_refresh_ms == 0 || d.calm_refresh_ms == 0 {
            return Err(Invalid("display refresh intervals must be > 0"));
        }

        Ok(())
    }

    /// Startup configuration: the document (or defaults), then the
    /// deployment overrides, then validation.  Anything that fails falls
    /// back to the defaults.
    pub fn resolve(overrides: &Overrides<'_>) -> Self {
        let mut config = match overrides.document {
            Some(json) => Self::from_json(json).unwrap_or_else(|e| {
                warn!("config document rejected ({}), using defaults", e);
                Self::default()
            }),
            None => Self::default(),
        };

        if let Some(ssid) = overrides.wifi_ssid {
            config.network.ssid = bounded(ssid);
        }
        if let Some(pass) = overrides.wifi_pass {
            config.network.password = bounded(pass);
        }
        if let Some(endpoint) = overrides.endpoint {
            config.network.endpoint = bounded(endpoint);
        }

        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("config invalid ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Configuration of channel `id`, if monitored.
    pub fn channel(&self, id: ChannelId) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.id == id)
    }
}

/// Deployment-specific values supplied outside the defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides<'a> {
    /// Full JSON config document.
    pub document: Option<&'a str>,
    pub wifi_ssid: Option<&'a str>,
    pub wifi_pass: Option<&'a str>,
    pub endpoint: Option<&'a str>,
}

impl Overrides<'static> {
    /// Values baked in at build time through `HAZARDWATCH_*` variables.
    pub fn from_build_env() -> Self {
        Self {
            document: option_env!("HAZARDWATCH_CONFIG"),
            wifi_ssid: option_env!("HAZARDWATCH_WIFI_SSID"),
            wifi_pass: option_env!("HAZARDWATCH_WIFI_PASS"),
            endpoint: option_env!("HAZARDWATCH_ENDPOINT"),
        }
    }
}

/// Copy `s` into a bounded string, truncating at capacity.
pub fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok(), "{:?}", c.validate());
        assert_eq!(c.channels.len(), 3);
        assert!(c.network.verify_tls, "certificate validation must default on");
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = SystemConfig::from_json(&json).unwrap();
        assert_eq!(c.network, c2.network);
        assert_eq!(c.channels.len(), c2.channels.len());
        assert_eq!(c.channels[2].id, c2.channels[2].id);
        assert!((c.channels[0].margin_v - c2.channels[0].margin_v).abs() < 1e-6);
        assert!((c.seismic.low_g - c2.seismic.low_g).abs() < 1e-6);
        assert_eq!(c.report, c2.report);
        assert_eq!(c.display, c2.display);
    }

    #[test]
    fn garbage_json_is_corrupted() {
        assert!(matches!(SystemConfig::from_json("{not json"), Err(ConfigError::Corrupted)));
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.report.alarm_interval_ms < c.report.calm_interval_ms,
            "alarms should be reported more often than calm status"
        );
        assert!(
            c.display.alarm_refresh_ms < c.report.alarm_interval_ms,
            "display should refresh faster than reports go out"
        );
    }

    #[test]
    fn rejects_too_few_samples() {
        let mut c = SystemConfig::default();
        c.sampler.samples = 4;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn rejects_inverted_seismic_band() {
        let mut c = SystemConfig::default();
        c.seismic.high_g = Some(0.4);
        assert!(c.validate().is_err());
        c.seismic.high_g = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_positive_curve_exponent() {
        let mut c = SystemConfig::default();
        c.channels[0].model.curve_b = 1.2;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_channels() {
        let mut c = SystemConfig::default();
        c.channels[1] = ChannelConfig::mq6();
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut c = SystemConfig::default();
        c.network.endpoint = bounded("mqtt://broker/topic");
        assert!(c.validate().is_err());
    }

    #[test]
    fn bounded_truncates_at_capacity() {
        let s: String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn overrides_replace_credentials() {
        let c = SystemConfig::resolve(&Overrides {
            wifi_ssid: Some("Plant-3"),
            wifi_pass: Some("s3cret-pass"),
            endpoint: Some("https://alarms.example.net/ingest"),
            ..Overrides::default()
        });
        assert_eq!(c.network.ssid.as_str(), "Plant-3");
        assert_eq!(c.network.password.as_str(), "s3cret-pass");
        assert_eq!(c.network.endpoint.as_str(), "https://alarms.example.net/ingest");
    }

    #[test]
    fn invalid_override_falls_back_to_defaults() {
        let c = SystemConfig::resolve(&Overrides { endpoint: Some("ftp://nope"), ..Overrides::default() });
        assert_eq!(c, SystemConfig::default());
    }

    #[test]
    fn corrupt_document_falls_back_to_defaults() {
        let c = SystemConfig::resolve(&Overrides { document: Some("{"), ..Overrides::default() });
        assert_eq!(c, SystemConfig::default());
    }
}
