//! The boombox rig: body, speakers, display and knobs.
//!
//! Laid out in rig-local units (800 fits the shorter window side, y grows
//! downward like a screen) and mapped into window space by [`Rig`].

use boombox_api::{Bounds, Canvas, Hsba, Paint, ENERGY_MAX};

use crate::audio::EnergySample;
use crate::utils::math::{map_clamped, map_range};

/// Local units that span the shorter window side
const REFERENCE: f32 = 800.0;
const BODY: (f32, f32, f32) = (400.0, 300.0, 30.0);
const SPEAKER_X: f32 = 120.0;
const SPEAKER_CONE: f32 = 180.0;
const SPEAKER_RINGS: usize = 8;
const DISPLAY: (f32, f32, f32, f32) = (0.0, -100.0, 200.0, 40.0);
/// VU meter: level 0.3 already fills it
const METER_LEVEL: f32 = 0.3;
const METER_WIDTH: f32 = 90.0;
const KNOBS: [f32; 3] = [-80.0, 0.0, 80.0];

/// Maps rig-local coordinates into window space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rig {
    x: f32,
    y: f32,
    scale: f32,
}

impl Rig {
    /// Centered in `bounds`, breathing with the amplitude level
    pub fn new(bounds: Bounds, level: f32) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            scale: bounds.min_side() / REFERENCE * (1.0 + level.clamp(0.0, 1.0) * 0.3),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn point(&self, lx: f32, ly: f32) -> (f32, f32) {
        (self.x + lx * self.scale, self.y - ly * self.scale)
    }

    fn rect(&self, canvas: &mut dyn Canvas, l: (f32, f32, f32, f32), radius: f32, paint: Paint) {
        let (x, y) = self.point(l.0, l.1);
        let s = self.scale;
        canvas.rect(x, y, l.2 * s, l.3 * s, radius * s, scaled(paint, s));
    }

    fn circle(&self, canvas: &mut dyn Canvas, lx: f32, ly: f32, diameter: f32, paint: Paint) {
        let (x, y) = self.point(lx, ly);
        let d = diameter * self.scale;
        canvas.ellipse(x, y, d, d, scaled(paint, self.scale));
    }

    fn line(&self, canvas: &mut dyn Canvas, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsba) {
        canvas.line(
            self.point(from.0, from.1),
            self.point(to.0, to.1),
            weight * self.scale,
            color,
        );
    }
}

fn scaled(paint: Paint, scale: f32) -> Paint {
    match paint {
        Paint::Stroke { color, weight } => Paint::Stroke {
            color,
            weight: weight * scale,
        },
        fill => fill,
    }
}

/// Width of the VU meter fill for an amplitude level
pub fn meter_width(level: f32) -> f32 {
    map_clamped(level, 0.0, METER_LEVEL, 0.0, METER_WIDTH)
}

/// Cone diameter for the current bass
pub fn speaker_diameter(bass: f32) -> f32 {
    SPEAKER_CONE + map_clamped(bass, 0.0, ENERGY_MAX, 0.0, 20.0)
}

/// Draws the rig; `glow` in 0-1 lights the halo behind the body
pub fn draw_rig(canvas: &mut dyn Canvas, bounds: Bounds, energy: &EnergySample, glow: f32) {
    let rig = Rig::new(bounds, energy.level);
    let (bw, bh, br) = BODY;

    if glow > 0.01 {
        rig.rect(
            canvas,
            (0.0, 0.0, bw + 40.0, bh + 40.0),
            br + 10.0,
            Paint::Fill(Hsba::new(320.0, 80.0, 100.0, glow.min(1.0) * 35.0)),
        );
    }

    rig.rect(
        canvas,
        (0.0, 0.0, bw, bh),
        br,
        Paint::Fill(Hsba::opaque(220.0, 60.0, 30.0)),
    );

    let grille = Hsba::opaque(180.0, 80.0, 60.0);
    rig.line(canvas, (-180.0, -80.0), (180.0, -80.0), 3.0, grille);
    rig.line(canvas, (-180.0, 80.0), (180.0, 80.0), 3.0, grille);

    let cone = speaker_diameter(energy.bass);
    let ring = Paint::Stroke {
        color: Hsba::opaque(200.0, 80.0, 50.0),
        weight: 2.0,
    };
    for side in [-SPEAKER_X, SPEAKER_X] {
        rig.circle(canvas, side, 0.0, cone, Paint::Fill(Hsba::opaque(240.0, 70.0, 20.0)));
        for i in 0..SPEAKER_RINGS {
            rig.circle(canvas, side, 0.0, (20.0 + i as f32 * 10.0) * 2.0, ring);
        }
    }

    draw_display(canvas, &rig, energy);

    for knob in KNOBS {
        rig.circle(canvas, knob, 100.0, 40.0, Paint::Fill(Hsba::opaque(180.0, 70.0, 60.0)));
    }
}

fn draw_display(canvas: &mut dyn Canvas, rig: &Rig, energy: &EnergySample) {
    let (dx, dy, dw, dh) = DISPLAY;
    rig.rect(canvas, DISPLAY, 10.0, Paint::Fill(Hsba::opaque(280.0, 80.0, 40.0)));

    // Meter grows rightward from the display's left third
    let width = meter_width(energy.level);
    if width > 0.0 {
        let left = dx - dw / 2.0 + 5.0;
        rig.rect(
            canvas,
            (left + width / 2.0, dy, width, 20.0),
            5.0,
            Paint::Fill(Hsba::opaque(320.0, 90.0, 90.0)),
        );
    }

    // EQ bars stand on the display's lower edge
    let floor = dy + dh / 2.0 - 5.0;
    let bands = [(energy.bass, 180.0), (energy.mid, 140.0), (energy.treble, 60.0)];
    for (i, (value, hue)) in bands.into_iter().enumerate() {
        let height = map_range(value.clamp(0.0, ENERGY_MAX), 0.0, ENERGY_MAX, 2.0, dh - 10.0);
        rig.rect(
            canvas,
            (30.0 + i as f32 * 25.0, floor - height / 2.0, 14.0, height),
            2.0,
            Paint::Fill(Hsba::opaque(hue, 80.0, 90.0)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boombox_api::BlendMode;

    #[derive(Default)]
    struct Shapes {
        rects: Vec<(f32, f32, f32, f32)>,
        ellipses: usize,
        lines: usize,
    }

    impl Canvas for Shapes {
        fn blend_mode(&self) -> BlendMode {
            BlendMode::Normal
        }
        fn set_blend_mode(&mut self, _: BlendMode) {}
        fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, _: f32, _: Paint) {
            self.rects.push((x, y, w, h));
        }
        fn ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: Paint) {
            self.ellipses += 1;
        }
        fn line(&mut self, _: (f32, f32), _: (f32, f32), _: f32, _: Hsba) {
            self.lines += 1;
        }
        fn polyline(&mut self, _: &[(f32, f32)], _: f32, _: Hsba) {}
        fn text(&mut self, _: &str, _: f32, _: f32, _: u32, _: Hsba) {}
    }

    #[test]
    fn test_scale_follows_window_and_level() {
        let bounds = Bounds::from_w_h(1600.0, 800.0);
        assert_eq!(Rig::new(bounds, 0.0).scale(), 1.0);
        assert!((Rig::new(bounds, 1.0).scale() - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_local_y_points_down() {
        let rig = Rig::new(Bounds::new(100.0, 50.0, 800.0, 800.0), 0.0);
        assert_eq!(rig.point(10.0, 20.0), (110.0, 30.0));
    }

    #[test]
    fn test_meter_clamped_to_display() {
        assert_eq!(meter_width(0.0), 0.0);
        assert_eq!(meter_width(0.15), 45.0);
        assert_eq!(meter_width(1.0), 90.0);
    }

    #[test]
    fn test_speaker_pulse() {
        assert_eq!(speaker_diameter(0.0), 180.0);
        assert_eq!(speaker_diameter(255.0), 200.0);
        assert_eq!(speaker_diameter(1000.0), 200.0);
    }

    #[test]
    fn test_rig_parts() {
        let energy = EnergySample::new(255.0, 100.0, 50.0, 0.2);
        let mut canvas = Shapes::default();
        draw_rig(&mut canvas, Bounds::from_w_h(800.0, 800.0), &energy, 1.0);

        // halo, body, display, meter, 3 eq bars
        assert_eq!(canvas.rects.len(), 7);
        // 2 cones with 8 rings each, 3 knobs
        assert_eq!(canvas.ellipses, 2 * 9 + 3);
        assert_eq!(canvas.lines, 2);

        let scale = 1.0 + 0.2 * 0.3;
        let body = canvas.rects[1];
        assert!((body.2 - 400.0 * scale).abs() < 1e-3);
        assert!((body.3 - 300.0 * scale).abs() < 1e-3);
    }

    #[test]
    fn test_no_halo_without_glow() {
        let mut canvas = Shapes::default();
        draw_rig(&mut canvas, Bounds::from_w_h(800.0, 800.0), &EnergySample::SILENT, 0.0);
        // body, display, 3 eq bars; no meter at zero level
        assert_eq!(canvas.rects.len(), 5);
    }
}
