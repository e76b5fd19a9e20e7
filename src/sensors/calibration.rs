//! One-shot clean-air baseline calibration.
//!
//! Runs once at boot, before the control loop.  The warm-up window is split
//! into ticks; every tick samples each gas channel, polls the accelerometer
//! (priming [`MotionDetector`] so the first real poll does not see a jump
//! from the origin) and sleeps for the tick period.
//!
//! ```text
//!   tick 0 ─ tick 1 ─ … ─ tick N-1      baseline = Σ volts / N
//! ```

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::info;

use crate::app::ports::{MotionPort, SensorPort};
use crate::config::{CalibrationConfig, ChannelConfig};
use crate::sensors::channel::{Baseline, MAX_CHANNELS};
use crate::sensors::motion::MotionDetector;
use crate::sensors::sampler::VoltageSampler;

/// Fixed-duration calibration plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibrator {
    ticks: u32,
    tick_ms: u32,
    samples_per_tick: u16,
}

impl Calibrator {
    pub fn new(cfg: &CalibrationConfig) -> Self {
        let tick_ms = cfg.tick_ms.max(1);
        Self {
            ticks: (cfg.duration_ms / tick_ms).max(1),
            tick_ms,
            samples_per_tick: cfg.samples_per_tick.max(1),
        }
    }

    /// Number of sampling ticks in the window.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    /// Wall-clock length of the window in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.ticks * self.tick_ms
    }

    /// Run the warm-up pass and return one baseline per configured channel,
    /// in configuration order.  `progress(done, total)` is called after
    /// every tick.
    pub fn run(
        &self,
        channels: &[ChannelConfig],
        sampler: &VoltageSampler,
        motion: &mut MotionDetector,
        hw: &mut (impl SensorPort + MotionPort),
        delay: &mut impl DelayNs,
        mut progress: impl FnMut(u32, u32),
    ) -> Vec<Baseline, MAX_CHANNELS> {
        info!(
            "calibration: {} channel(s), {} ticks x {} ms",
            channels.len(),
            self.ticks,
            self.tick_ms
        );

        let mut sums = [0.0_f32; MAX_CHANNELS];

        for tick in 0..self.ticks {
            for (sum, ch) in sums.iter_mut().zip(channels) {
                *sum += sampler.sample_n(self.samples_per_tick, || hw.read_raw(ch.id), delay);
            }
            // Output discarded; only the stored state matters here.
            let _ = motion.poll(hw);
            delay.delay_ms(self.tick_ms);
            progress(tick + 1, self.ticks);
        }

        channels
            .iter()
            .zip(sums)
            .map(|(ch, sum)| Baseline { id: ch.id, volts: sum / self.ticks as f32 })
            .collect()
    }
}
