//! Averaging ADC voltage sampler.
//!
//! Takes `n` raw reads spaced by a fixed delay and converts the mean to
//! volts.  The delay goes through [`DelayNs`] so host tests can pass a
//! zero-cost fake.

use embedded_hal::delay::DelayNs;

use crate::config::SamplerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSampler {
    samples: u16,
    inter_sample_delay_us: u32,
    vref: f32,
    adc_max: u16,
}

impl VoltageSampler {
    pub fn new(cfg: &SamplerConfig) -> Self {
        Self {
            samples: cfg.samples.max(1),
            inter_sample_delay_us: cfg.inter_sample_delay_us,
            vref: cfg.vref,
            adc_max: cfg.adc_max.max(1),
        }
    }

    pub fn samples(&self) -> u16 {
        self.samples
    }

    /// Convert a (possibly fractional) raw ADC value to volts.
    pub fn to_volts(&self, raw: f32) -> f32 {
        self.vref * raw / f32::from(self.adc_max)
    }

    /// Mean of `self.samples()` reads of `read`, in volts.
    pub fn sample(&self, read: impl FnMut() -> u16, delay: &mut impl DelayNs) -> f32 {
        self.sample_n(self.samples, read, delay)
    }

    /// Mean of `n` reads of `read`, in volts.  `n == 0` reads nothing and
    /// returns 0 V.
    pub fn sample_n(&self, n: u16, mut read: impl FnMut() -> u16, delay: &mut impl DelayNs) -> f32 {
        if n == 0 {
            return 0.0;
        }
        let mut sum: u32 = 0;
        for _ in 0..n {
            sum += u32::from(read().min(self.adc_max));
            delay.delay_us(self.inter_sample_delay_us);
        }
        self.to_volts(sum as f32 / f32::from(n))
    }
}
