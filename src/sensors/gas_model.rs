//! Resistive metal-oxide (MQ-series) gas sensor model.
//!
//! The module's load resistor and the sensing element form a divider:
//!
//! ```text
//!   Vcc ── R_s ──┬── R_load ── GND
//!                └── V_sensor (ADC)
//! ```
//!
//! `R_s = Vcc·R_load / V − R_load`, then `ppm = A · (R_s / R_0)^B` with the
//! datasheet curve constants `A` and `B` (B < 0).  `R_0` is a bench-measured
//! clean-air resistance; it is unrelated to the baseline *voltage* the
//! calibrator records at boot.

use crate::config::{CompensationConfig, GasModelConfig};

/// Voltages at or below this are treated as "no signal".
pub const NO_SIGNAL_V: f32 = 0.01;

/// Ambient conditions used for R_0 compensation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Linear temperature/humidity correction of R_0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compensation {
    pub k_t: f32,
    pub t_ref_c: f32,
    pub k_h: f32,
    pub h_ref_pct: f32,
}

impl Compensation {
    pub fn from_config(cfg: &CompensationConfig) -> Self {
        Self {
            k_t: cfg.k_t,
            t_ref_c: cfg.t_ref_c,
            k_h: cfg.k_h,
            h_ref_pct: cfg.h_ref_pct,
        }
    }

    /// Scale factor applied to R_0 under `ambient`.
    pub fn factor(&self, ambient: Ambient) -> f32 {
        1.0 - self.k_t * (ambient.temperature_c - self.t_ref_c)
            - self.k_h * (ambient.humidity_pct - self.h_ref_pct)
    }
}

/// Per-sensor curve and circuit constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasModel {
    pub vcc: f32,
    pub r_load: f32,
    pub r0: f32,
    pub a: f32,
    pub b: f32,
    pub max_ppm: f32,
    /// Resistance ratio mapped to 100 % by [`pollution_percent`](Self::pollution_percent).
    pub ratio_full_scale: f32,
}

impl GasModel {
    pub fn from_config(cfg: &GasModelConfig) -> Self {
        Self {
            vcc: cfg.vcc,
            r_load: cfg.r_load_ohm,
            r0: cfg.r0_ohm,
            a: cfg.curve_a,
            b: cfg.curve_b,
            max_ppm: cfg.max_ppm,
            ratio_full_scale: cfg.ratio_full_scale,
        }
    }

    /// Sensing-element resistance in ohms, `None` when there is no signal.
    pub fn resistance(&self, volts: f32) -> Option<f32> {
        if !volts.is_finite() || volts <= NO_SIGNAL_V {
            return None;
        }
        let rs = (self.vcc * self.r_load / volts) - self.r_load;
        Some(rs.max(0.0))
    }

    /// R_0 after optional ambient compensation.  A correction that would
    /// drive R_0 to zero or below is ignored.
    pub fn effective_r0(&self, comp: Option<(&Compensation, Ambient)>) -> f32 {
        let Some((comp, ambient)) = comp else {
            return self.r0;
        };
        let r0 = self.r0 * comp.factor(ambient);
        if r0.is_finite() && r0 > 0.0 { r0 } else { self.r0 }
    }

    /// `R_s / R_0_eff`, `None` when there is no signal.
    pub fn ratio(&self, volts: f32, comp: Option<(&Compensation, Ambient)>) -> Option<f32> {
        let rs = self.resistance(volts)?;
        Some(rs / self.effective_r0(comp))
    }

    /// Gas concentration in ppm, clamped to `[0, max_ppm]`.
    pub fn concentration(&self, volts: f32, comp: Option<(&Compensation, Ambient)>) -> f32 {
        let Some(ratio) = self.ratio(volts, comp) else {
            return 0.0;
        };
        if ratio <= 0.0 {
            // Element resistance collapsed: sensor saturated.
            return self.max_ppm;
        }
        let ppm = self.a * ratio.powf(self.b);
        if ppm.is_nan() {
            return 0.0;
        }
        ppm.clamp(0.0, self.max_ppm)
    }

    /// Relative pollution level: ratio 1.0 (clean air) → 0 %,
    /// `ratio_full_scale` → 100 %.
    pub fn pollution_percent(&self, volts: f32, comp: Option<(&Compensation, Ambient)>) -> f32 {
        let Some(ratio) = self.ratio(volts, comp) else {
            return 0.0;
        };
        let span = self.ratio_full_scale - 1.0;
        if span == 0.0 {
            return 0.0;
        }
        ((ratio - 1.0) * 100.0 / span).clamp(0.0, 100.0)
    }
}
