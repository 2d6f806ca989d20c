//! Logical frame clock.
//!
//! Motion advances one step per rendered frame. A scaled tick stretches
//! each step by how many 60 Hz frames actually elapsed.

/// Frame length the per-frame constants are tuned for
const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;
/// Upper bound on a single step after a stall
const MAX_SCALE: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    scale: f32,
}

impl Tick {
    /// One plain frame step
    pub const FRAME: Tick = Tick { scale: 1.0 };

    /// Step scaled by wall-clock time since the previous frame
    pub fn from_elapsed(secs: f32) -> Self {
        let scale = secs / REFERENCE_FRAME_SECS;
        if scale.is_finite() {
            Self {
                scale: scale.clamp(0.0, MAX_SCALE),
            }
        } else {
            Self::FRAME
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Additive per-frame delta for this tick
    pub fn step(&self, delta: f32) -> f32 {
        delta * self.scale
    }

    /// Multiplicative per-frame factor for this tick
    pub fn decay(&self, factor: f32) -> f32 {
        if self.scale == 1.0 {
            factor
        } else {
            factor.powf(self.scale)
        }
    }
}

impl Default for Tick {
    fn default() -> Self {
        Self::FRAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_tick_is_identity() {
        assert_eq!(Tick::FRAME.step(2.5), 2.5);
        assert_eq!(Tick::FRAME.decay(0.9), 0.9);
    }

    #[test]
    fn test_two_frames_elapsed() {
        let tick = Tick::from_elapsed(2.0 / 60.0);
        assert!((tick.scale() - 2.0).abs() < 1e-4);
        assert!((tick.step(3.0) - 6.0).abs() < 1e-3);
        assert!((tick.decay(0.9) - 0.81).abs() < 1e-4);
    }

    #[test]
    fn test_stall_is_capped() {
        assert_eq!(Tick::from_elapsed(10.0).scale(), 4.0);
        assert_eq!(Tick::from_elapsed(f32::NAN), Tick::FRAME);
        assert_eq!(Tick::from_elapsed(-1.0).scale(), 0.0);
    }
}
