//! Embers tossed up from below the rig on every beat.
//!
//! Ballistic: gravity pulls them down, drag bleeds off sideways speed.

use boombox_api::{Canvas, Hsba, Paint, ENERGY_MAX};
use nannou::prelude::*;
use rand::Rng;

use super::Particle;
use crate::utils::{ConfigError, Tick};

/// Below this alpha an ember is gone
const EPSILON: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmberConfig {
    /// Embers per beat
    pub count: usize,
    /// Horizontal spread either side of the origin at full bass
    pub spread: f32,
    /// Vertical jitter either side of the origin
    pub band: f32,
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Horizontal velocity multiplier per frame
    pub drag: f32,
    /// Alpha multiplier per frame
    pub fade: f32,
    pub ceiling: usize,
}

impl Default for EmberConfig {
    fn default() -> Self {
        Self {
            count: 24,
            spread: 160.0,
            band: 10.0,
            gravity: 0.08,
            drag: 0.98,
            fade: 0.92,
            ceiling: 120,
        }
    }
}

impl EmberConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fade > 0.0 && self.fade < 1.0) {
            return Err(ConfigError::DecayRate(self.fade));
        }
        if self.ceiling == 0 {
            return Err(ConfigError::Ceiling("ember_ceiling"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ember {
    position: Vec2,
    velocity: Vec2,
    size: f32,
    hue: f32,
    alpha: f32,
    gravity: f32,
    drag: f32,
    fade: f32,
}

impl Ember {
    /// Embers for one detected beat; louder bass throws them wider
    pub fn burst<R: Rng + ?Sized>(
        bass: f32,
        origin: Vec2,
        config: &EmberConfig,
        rng: &mut R,
    ) -> Vec<Ember> {
        let reach = (bass / ENERGY_MAX).clamp(0.0, 1.0) * config.spread;

        (0..config.count)
            .map(|_| {
                let dx = if reach > 0.0 {
                    rng.random_range(-reach..reach)
                } else {
                    0.0
                };
                let dy = if config.band > 0.0 {
                    rng.random_range(-config.band..config.band)
                } else {
                    0.0
                };
                Ember {
                    position: origin + vec2(dx, dy),
                    // Upward bias: y-up window space
                    velocity: vec2(rng.random_range(-2.5..2.5), rng.random_range(2.0..6.0)),
                    size: rng.random_range(2.0..5.0),
                    hue: rng.random_range(15.0..45.0),
                    alpha: 100.0,
                    gravity: config.gravity,
                    drag: config.drag,
                    fade: config.fade,
                }
            })
            .collect()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }
}

impl Particle for Ember {
    fn update(&mut self, tick: Tick) {
        self.position += self.velocity * tick.scale();
        self.velocity.y -= tick.step(self.gravity);
        self.velocity.x *= tick.decay(self.drag);
        self.alpha *= tick.decay(self.fade);
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let (x, y) = (self.position.x, self.position.y);
        let halo = self.size * 2.5;
        canvas.ellipse(
            x,
            y,
            halo,
            halo,
            Paint::Fill(Hsba::new(self.hue, 90.0, 100.0, self.alpha * 0.3)),
        );
        canvas.ellipse(
            x,
            y,
            self.size,
            self.size,
            Paint::Fill(Hsba::new(self.hue, 60.0, 100.0, self.alpha)),
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
    use crate::renderer::particles::Pool;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn burst(bass: f32, seed: u64) -> Vec<Ember> {
        let mut rng = StdRng::seed_from_u64(seed);
        Ember::burst(bass, Vec2::ZERO, &EmberConfig::default(), &mut rng)
    }

    #[test]
    fn test_fixed_count_and_upward_start() {
        let embers = burst(200.0, 1);
        assert_eq!(embers.len(), 24);
        for ember in &embers {
            assert!(ember.velocity().y >= 2.0);
            assert!((15.0..45.0).contains(&ember.hue()));
        }
    }

    #[test]
    fn test_spread_grows_with_bass() {
        let quiet = burst(0.0, 2);
        assert!(quiet.iter().all(|e| e.position().x == 0.0));

        let loud = burst(255.0, 2);
        assert!(loud.iter().all(|e| e.position().x.abs() <= 160.0));
        assert!(loud.iter().all(|e| e.position().y.abs() <= 10.0));
    }

    #[test]
    fn test_ballistic_motion() {
        let mut ember = burst(100.0, 3).remove(0);
        let start = ember.velocity();
        ember.update(Tick::FRAME);
        assert!((ember.velocity().y - (start.y - 0.08)).abs() < 1e-5);
        assert!((ember.velocity().x - start.x * 0.98).abs() < 1e-5);
        assert!((ember.alpha() - 92.0).abs() < 1e-4);
    }

    #[test]
    fn test_alpha_never_increases() {
        let mut ember = burst(100.0, 4).remove(0);
        let mut alpha = ember.alpha();
        for _ in 0..100 {
            ember.update(Tick::FRAME);
            assert!(ember.alpha() <= alpha);
            alpha = ember.alpha();
        }
    }

    #[test]
    fn test_thirty_embers_burn_out() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = EmberConfig {
            count: 30,
            ..EmberConfig::default()
        };
        let mut pool = Pool::new(config.ceiling);
        pool.spawn(Ember::burst(255.0, Vec2::ZERO, &config, &mut rng));
        assert_eq!(pool.len(), 30);

        for _ in 0..200 {
            pool.advance(Tick::FRAME);
        }
        assert!(pool.is_empty());
    }
}
