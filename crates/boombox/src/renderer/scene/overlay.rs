//! Transient text banners drawn over the scene.

use boombox_api::{Bounds, Canvas, Hsba};

use crate::utils::Tick;

/// Fade for banners that don't pick their own
const DEFAULT_FADE: f32 = 4.0 / 255.0;

/// Where a banner sits
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Distance below the top edge
    Top(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    /// Full opacity for this many more frames, then fade
    Holding(f32),
    /// Full opacity until `fade_out` is called
    Pinned,
    Fading,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    text: String,
    /// Opacity 0-1
    alpha: f32,
    fade_per_frame: f32,
    phase: Phase,
    anchor: Anchor,
    size: u32,
}

impl Overlay {
    /// Starts fading immediately
    pub fn fading(text: impl Into<String>, fade_per_frame: f32) -> Self {
        Self::with_phase(text, fade_per_frame, Phase::Fading)
    }

    /// Full opacity for `frames`, then fades
    pub fn held(text: impl Into<String>, frames: u32) -> Self {
        Self::with_phase(text, DEFAULT_FADE, Phase::Holding(frames as f32))
    }

    /// Full opacity until `fade_out`
    pub fn pinned(text: impl Into<String>) -> Self {
        Self::with_phase(text, DEFAULT_FADE, Phase::Pinned)
    }

    fn with_phase(text: impl Into<String>, fade_per_frame: f32, phase: Phase) -> Self {
        Self {
            text: text.into(),
            alpha: 1.0,
            fade_per_frame: fade_per_frame.max(0.0),
            phase,
            anchor: Anchor::Top(40.0),
            size: 24,
        }
    }

    pub fn at(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn fade(mut self, per_frame: f32) -> Self {
        self.fade_per_frame = per_frame.max(0.0);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn fade_out(&mut self) {
        self.phase = Phase::Fading;
    }

    pub fn advance(&mut self, tick: Tick) {
        match self.phase {
            Phase::Holding(frames) => {
                let left = frames - tick.scale();
                self.phase = if left > 0.0 {
                    Phase::Holding(left)
                } else {
                    Phase::Fading
                };
            }
            Phase::Pinned => {}
            Phase::Fading => {
                self.alpha = (self.alpha - tick.step(self.fade_per_frame)).max(0.0);
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn render(&self, canvas: &mut dyn Canvas, bounds: Bounds) {
        if self.is_done() {
            return;
        }
        let y = match self.anchor {
            Anchor::Top(inset) => bounds.top() - inset,
        };
        canvas.text(
            &self.text,
            bounds.x,
            y,
            self.size,
            Hsba::WHITE.with_alpha(self.alpha * 100.0),
        );
    }
}
