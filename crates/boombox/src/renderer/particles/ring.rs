//! Expanding light rings, spawned while bass is above a floor.

use boombox_api::{Canvas, Hsba, Paint, ENERGY_MAX};
use nannou::prelude::*;
use rand::Rng;

use super::Particle;
use crate::utils::math::{map_clamped, map_range};
use crate::utils::{ConfigError, Tick};

/// Size range that growth and stroke weight are keyed to
const SIZE_LOW: f32 = 50.0;
const SIZE_HIGH: f32 = 250.0;
/// Growth per frame across the size range
const GROWTH_LOW: f32 = 2.0;
const GROWTH_HIGH: f32 = 6.0;
/// Alpha lost per frame, keyed to growth (slow growers fade faster)
const FADE_AT_LOW_GROWTH: f32 = 3.0;
const FADE_AT_HIGH_GROWTH: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingConfig {
    /// Bass at or below this spawns nothing
    pub floor: f32,
    /// Ring count range across floor..255 (upper end reached only at 255)
    pub count: (f32, f32),
    /// Initial alpha range across floor..255
    pub alpha: (f32, f32),
    pub ceiling: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            floor: 50.0,
            count: (1.0, 4.0),
            alpha: (100.0, 200.0),
            ceiling: 200,
        }
    }
}

impl RingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.floor.is_finite() || self.floor < 0.0 {
            return Err(ConfigError::NegativeThreshold {
                name: "ring_floor",
                value: self.floor,
            });
        }
        if self.floor >= ENERGY_MAX {
            return Err(ConfigError::Excitation {
                name: "ring",
                floor: self.floor,
                ceiling: ENERGY_MAX,
            });
        }
        if self.ceiling == 0 {
            return Err(ConfigError::Ceiling("ring_ceiling"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    center: Vec2,
    size: f32,
    hue: f32,
    alpha: f32,
    growth: f32,
}

impl Ring {
    pub fn new(center: Vec2, size: f32, alpha: f32, hue: f32) -> Self {
        Self {
            center,
            size,
            hue,
            alpha,
            growth: map_range(size, SIZE_LOW, SIZE_HIGH, GROWTH_LOW, GROWTH_HIGH),
        }
    }

    /// Rings for one frame of bass energy; empty at or below the floor
    pub fn burst<R: Rng + ?Sized>(
        bass: f32,
        center: Vec2,
        config: &RingConfig,
        rng: &mut R,
    ) -> Vec<Ring> {
        if !(bass > config.floor) {
            return Vec::new();
        }

        let excite = |(low, high): (f32, f32)| map_clamped(bass, config.floor, ENERGY_MAX, low, high);
        let count = excite(config.count).floor().max(1.0) as usize;
        let size = excite((SIZE_LOW, SIZE_HIGH));
        let alpha = excite(config.alpha);

        (0..count)
            .map(|_| Ring::new(center, size, alpha, rng.random_range(200.0..360.0)))
            .collect()
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn growth(&self) -> f32 {
        self.growth
    }
}

impl Particle for Ring {
    fn update(&mut self, tick: Tick) {
        self.size += tick.step(self.growth);
        let fade = map_range(
            self.growth,
            GROWTH_LOW,
            GROWTH_HIGH,
            FADE_AT_LOW_GROWTH,
            FADE_AT_HIGH_GROWTH,
        );
        self.alpha -= tick.step(fade.max(0.0));
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let weight = map_range(self.size, SIZE_LOW, SIZE_HIGH, 2.0, 8.0);
        canvas.ellipse(
            self.center.x,
            self.center.y,
            self.size,
            self.size,
            Paint::Stroke {
                color: Hsba::new(self.hue, 80.0, 100.0, self.alpha),
                weight,
            },
        );
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }

    fn is_expired(&self) -> bool {
        self.alpha <= 0.0
    }
}
