//! Seismic detector over a 3-axis accelerometer.
//!
//! Each poll converts the raw triple to g, sums the per-axis change since
//! the previous poll and classifies it against a band:
//!
//! ```text
//!   0 ──── low ════ quake ════ high ──── ∞
//!   noise          (open band)        glitch / saturation
//! ```

use log::debug;

use crate::app::ports::MotionPort;
use crate::config::SeismicConfig;

/// Last-seen acceleration (g) on each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MotionState {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Manhattan distance to `other`.
    pub fn delta(&self, other: &Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

/// Classification band for the per-poll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeismicBand {
    pub low_g: f32,
    /// `None` = single-sided threshold.
    pub high_g: Option<f32>,
}

impl SeismicBand {
    pub fn is_quake(&self, delta: f32) -> bool {
        delta > self.low_g && self.high_g.is_none_or(|high| delta < high)
    }
}

pub struct MotionDetector {
    state: MotionState,
    band: SeismicBand,
    lsb_per_g: f32,
}

impl MotionDetector {
    pub fn new(cfg: &SeismicConfig) -> Self {
        Self {
            state: MotionState::default(),
            band: SeismicBand { low_g: cfg.low_g, high_g: cfg.high_g },
            lsb_per_g: cfg.lsb_per_g,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn band(&self) -> SeismicBand {
        self.band
    }

    /// Read the device and classify.  An unavailable device yields `false`
    /// and leaves the stored state alone.
    pub fn poll(&mut self, device: &mut impl MotionPort) -> bool {
        match device.read_accel() {
            Some(raw) => self.observe_raw(raw),
            None => false,
        }
    }

    /// Classify a raw signed 16-bit triple.
    pub fn observe_raw(&mut self, raw: [i16; 3]) -> bool {
        let [x, y, z] = raw.map(|axis| f32::from(axis) / self.lsb_per_g);
        self.observe(MotionState::new(x, y, z))
    }

    /// Classify a sample already in g, then store it.
    pub fn observe(&mut self, sample: MotionState) -> bool {
        let delta = sample.delta(&self.state);
        self.state = sample;
        let quake = self.band.is_quake(delta);
        if quake {
            debug!("motion: delta={:.2}g → quake", delta);
        }
        quake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<[i16; 3]>);

    impl MotionPort for Fixed {
        fn read_accel(&mut self) -> Option<[i16; 3]> {
            self.0
        }

        fn read_temperature(&mut self) -> Option<f32> {
            None
        }
    }

    fn detector() -> MotionDetector {
        MotionDetector::new(&SeismicConfig::default())
    }

    #[test]
    fn band_edges_are_exclusive() {
        let band = SeismicBand { low_g: 0.5, high_g: Some(10.0) };
        assert!(!band.is_quake(0.5));
        assert!(band.is_quake(0.51));
        assert!(band.is_quake(9.99));
        assert!(!band.is_quake(10.0));
    }

    #[test]
    fn single_sided_band_has_no_ceiling() {
        let band = SeismicBand { low_g: 0.6, high_g: None };
        assert!(!band.is_quake(0.6));
        assert!(band.is_quake(50.0));
    }

    #[test]
    fn settled_to_shaken_is_quake() {
        let mut d = detector();
        d.observe(MotionState::new(0.0, 0.0, 1.0));
        assert!(d.observe(MotionState::new(0.0, 0.0, 1.62)));
    }

    #[test]
    fn saturation_jump_is_rejected() {
        let mut d = detector();
        d.observe(MotionState::new(0.0, 0.0, 1.0));
        assert!(!d.observe(MotionState::new(0.0, 0.0, 12.0)));
        assert_eq!(d.state(), MotionState::new(0.0, 0.0, 12.0));
    }

    #[test]
    fn raw_counts_are_scaled_by_full_scale() {
        let mut d = detector();
        d.observe_raw([0, 0, 16384]);
        assert_eq!(d.state(), MotionState::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn unavailable_device_keeps_state() {
        let mut d = detector();
        d.observe(MotionState::new(0.1, 0.2, 0.9));
        assert!(!d.poll(&mut Fixed(None)));
        assert_eq!(d.state(), MotionState::new(0.1, 0.2, 0.9));
    }

    #[test]
    fn first_poll_measures_from_origin() {
        let mut d = detector();
        // 1 g on Z from the (0,0,0) start is inside the default band.
        assert!(d.poll(&mut Fixed(Some([0, 0, 16384]))));
        // Same reading again: no movement.
        assert!(!d.poll(&mut Fixed(Some([0, 0, 16384]))));
    }
}
