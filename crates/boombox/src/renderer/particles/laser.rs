//! Laser beams fired outward from the rig on every beat.

use boombox_api::{Canvas, Hsba};
use nannou::prelude::*;
use rand::Rng;

use super::Particle;
use crate::utils::math::map_clamped;
use crate::utils::{ConfigError, Tick};

/// Below this alpha a beam is gone
const EPSILON: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserConfig {
    /// Bass range the beam count is keyed to
    pub energy: (f32, f32),
    /// Beam count across `energy`
    pub count: (f32, f32),
    pub speed: (f32, f32),
    pub thickness: (f32, f32),
    pub initial_alpha: f32,
    /// Alpha multiplier per frame
    pub fade: f32,
    /// Max hue offset either side of the rotating base
    pub hue_jitter: f32,
    pub ceiling: usize,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            energy: (120.0, 255.0),
            count: (6.0, 16.0),
            speed: (6.0, 14.0),
            thickness: (1.0, 3.5),
            initial_alpha: 80.0,
            fade: 0.9,
            hue_jitter: 20.0,
            ceiling: 80,
        }
    }
}

impl LaserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fade > 0.0 && self.fade < 1.0) {
            return Err(ConfigError::DecayRate(self.fade));
        }
        if !(self.energy.0 < self.energy.1) {
            return Err(ConfigError::Excitation {
                name: "laser",
                floor: self.energy.0,
                ceiling: self.energy.1,
            });
        }
        if self.ceiling == 0 {
            return Err(ConfigError::Ceiling("laser_ceiling"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LaserBeam {
    origin: Vec2,
    /// Direction in degrees
    angle: f32,
    hue: f32,
    length: f32,
    speed: f32,
    alpha: f32,
    /// Alpha multiplier per frame
    fade: f32,
    thickness: f32,
}

impl LaserBeam {
    /// Beams for one detected beat
    pub fn burst<R: Rng + ?Sized>(
        bass: f32,
        origin: Vec2,
        hue_base: f32,
        config: &LaserConfig,
        rng: &mut R,
    ) -> Vec<LaserBeam> {
        let (low, high) = config.energy;
        let count = map_clamped(bass, low, high, config.count.0, config.count.1)
            .floor()
            .max(0.0) as usize;

        (0..count)
            .map(|_| {
                let jitter = if config.hue_jitter > 0.0 {
                    rng.random_range(-config.hue_jitter..config.hue_jitter)
                } else {
                    0.0
                };
                LaserBeam {
                    origin,
                    angle: rng.random_range(0.0..360.0),
                    hue: (hue_base + jitter).rem_euclid(360.0),
                    length: 0.0,
                    speed: random_in(rng, config.speed),
                    alpha: config.initial_alpha,
                    fade: config.fade,
                    thickness: random_in(rng, config.thickness),
                }
            })
            .collect()
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Beam tip in window space
    pub fn tip(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        self.origin + vec2(radians.cos(), radians.sin()) * self.length
    }
}

fn random_in<R: Rng + ?Sized>(rng: &mut R, (low, high): (f32, f32)) -> f32 {
    if low < high {
        rng.random_range(low..high)
    } else {
        low
    }
}

impl Particle for LaserBeam {
    fn update(&mut self, tick: Tick) {
        self.length += tick.step(self.speed);
        self.alpha *= tick.decay(self.fade);
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let from = (self.origin.x, self.origin.y);
        let tip = self.tip();
        let to = (tip.x, tip.y);

        // Wide dim pass under the core reads as glow in additive mode
        canvas.line(
            from,
            to,
            self.thickness * 3.0,
            Hsba::new(self.hue, 90.0, 100.0, self.alpha * 0.25),
        );
        canvas.line(
            from,
            to,
            self.thickness,
            Hsba::new(self.hue, 60.0, 100.0, self.alpha),
        );
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn is_expired(&self) -> bool {
        self.alpha < EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_count_follows_bass() {
        let config = LaserConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let count = |bass: f32, rng: &mut StdRng| {
            LaserBeam::burst(bass, Vec2::ZERO, 0.0, &config, rng).len()
        };
        assert_eq!(count(120.0, &mut rng), 6);
        assert_eq!(count(60.0, &mut rng), 6);
        assert_eq!(count(255.0, &mut rng), 16);
        assert_eq!(count(187.5, &mut rng), 11);
    }

    #[test]
    fn test_spawn_bounds() {
        let config = LaserConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        for beam in LaserBeam::burst(255.0, Vec2::ZERO, 350.0, &config, &mut rng) {
            assert!((0.0..360.0).contains(&beam.angle()));
            assert!((0.0..360.0).contains(&beam.hue()));
            assert_eq!(beam.length(), 0.0);
            assert_eq!(beam.alpha(), 80.0);
            assert!((6.0..14.0).contains(&beam.speed));
            assert!((1.0..3.5).contains(&beam.thickness));
        }
    }

    #[test]
    fn test_lengthens_and_fades() {
        let config = LaserConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut beam = LaserBeam::burst(200.0, Vec2::ZERO, 0.0, &config, &mut rng).remove(0);

        let mut frames = 0;
        while !beam.is_expired() {
            let (length, alpha) = (beam.length(), beam.alpha());
            beam.update(Tick::FRAME);
            assert!(beam.length() > length);
            assert!(beam.alpha() < alpha);
            frames += 1;
        }
        // 80 * 0.9^n < 1 first holds at n = 42
        assert_eq!(frames, 42);
    }

    #[test]
    fn test_tip_follows_angle() {
        let mut beam = LaserBeam {
            origin: vec2(10.0, 0.0),
            angle: 90.0,
            hue: 0.0,
            length: 0.0,
            speed: 5.0,
            alpha: 80.0,
            fade: 0.9,
            thickness: 1.0,
        };
        beam.update(Tick::FRAME);
        let tip = beam.tip();
        assert!((tip.x - 10.0).abs() < 1e-4);
        assert!((tip.y - 5.0).abs() < 1e-4);
    }
}
