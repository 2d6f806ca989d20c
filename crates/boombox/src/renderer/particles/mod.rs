//! Short-lived beat-driven effects and the bounded pools that own them.

pub mod ember;
pub mod laser;
pub mod ring;

use boombox_api::Canvas;
use std::collections::VecDeque;

use crate::utils::Tick;

pub use ember::{Ember, EmberConfig};
pub use laser::{LaserBeam, LaserConfig};
pub use ring::{Ring, RingConfig};

/// Shared lifecycle of every effect.
///
/// Alpha never increases. Once `is_expired` turns true it stays true.
pub trait Particle {
    /// Advance kinematics and fade by one tick
    fn update(&mut self, tick: Tick);

    fn render(&self, canvas: &mut dyn Canvas);

    /// Current opacity on the 0-100 scale (may start above 100)
    fn alpha(&self) -> f32;

    fn is_expired(&self) -> bool;
}

/// Live particles of one kind, capped at `ceiling`.
///
/// Exceeding the ceiling evicts the oldest particles first, expired or not.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool<P> {
    particles: VecDeque<P>,
    ceiling: usize,
}

impl<P: Particle> Pool<P> {
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            particles: VecDeque::with_capacity(ceiling),
            ceiling,
        }
    }

    /// Add a burst; only the newest `ceiling` survive
    pub fn spawn<I: IntoIterator<Item = P>>(&mut self, burst: I) {
        for particle in burst {
            self.particles.push_back(particle);
        }
        self.evict();
    }

    fn evict(&mut self) {
        while self.particles.len() > self.ceiling {
            self.particles.pop_front();
        }
    }

    /// Update every particle, then drop the ones that expired
    pub fn advance(&mut self, tick: Tick) {
        for particle in self.particles.iter_mut() {
            particle.update(tick);
        }
        self.particles.retain(|p| !p.is_expired());
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        for particle in &self.particles {
            particle.render(canvas);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.particles.iter()
    }
}
