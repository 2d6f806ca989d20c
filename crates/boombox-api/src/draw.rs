//! Drawing boundary: paint types, the `Canvas` trait and its nannou adapter

use std::ops::{Deref, DerefMut};

use nannou::prelude::*;

/// How overlapping translucent draws combine
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over alpha blending
    #[default]
    Normal,
    /// Color channels sum, so overlapping glows brighten
    Additive,
}

/// Color in HSB space: hue 0-360, saturation/brightness/alpha 0-100
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsba {
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
    pub alpha: f32,
}

impl Hsba {
    pub const fn new(hue: f32, saturation: f32, brightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            alpha,
        }
    }

    pub const fn opaque(hue: f32, saturation: f32, brightness: f32) -> Self {
        Self::new(hue, saturation, brightness, 100.0)
    }

    pub const BLACK: Hsba = Hsba::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Hsba = Hsba::opaque(0.0, 0.0, 100.0);

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Convert to straight RGBA in 0-1, clamping every channel
    pub fn to_rgba(&self) -> [f32; 4] {
        let hue = self.hue.rem_euclid(360.0);
        let saturation = (self.saturation / 100.0).clamp(0.0, 1.0);
        let value = (self.brightness / 100.0).clamp(0.0, 1.0);
        let alpha = (self.alpha / 100.0).clamp(0.0, 1.0);

        let c = value * saturation;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = value - c;

        let (r1, g1, b1) = if hue < 60.0 {
            (c, x, 0.0)
        } else if hue < 120.0 {
            (x, c, 0.0)
        } else if hue < 180.0 {
            (0.0, c, x)
        } else if hue < 240.0 {
            (0.0, x, c)
        } else if hue < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        [r1 + m, g1 + m, b1 + m, alpha]
    }
}

/// Fill or outline
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Paint {
    Fill(Hsba),
    Stroke { color: Hsba, weight: f32 },
}

/// Immediate-mode 2D drawing surface.
///
/// Coordinates are window space with the origin at the center and y up.
/// Rectangles and ellipses are center-anchored.
pub trait Canvas {
    fn blend_mode(&self) -> BlendMode;

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Rectangle with optional rounded corners (`corner_radius` 0 = square)
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, corner_radius: f32, paint: Paint);

    fn ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsba);

    fn polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Hsba);

    /// Centered single-line text
    fn text(&mut self, text: &str, x: f32, y: f32, size: u32, color: Hsba);
}

/// Switches a canvas to a blend mode for the lifetime of the scope.
///
/// Dropping the scope always puts the canvas back in `BlendMode::Normal`.
pub struct BlendScope<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> BlendScope<'a, C> {
    pub fn new(canvas: &'a mut C, mode: BlendMode) -> Self {
        canvas.set_blend_mode(mode);
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized> Deref for BlendScope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> DerefMut for BlendScope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> Drop for BlendScope<'_, C> {
    fn drop(&mut self) {
        self.canvas.set_blend_mode(BlendMode::Normal);
    }
}

/// Outline of a rounded rectangle, counter-clockwise from the right edge.
///
/// The radius is clamped to half the shorter side.
pub fn rounded_rect_points(
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    radius: f32,
    segments_per_corner: usize,
) -> Vec<(f32, f32)> {
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    let segments = segments_per_corner.max(1);
    let half_w = w / 2.0 - r;
    let half_h = h / 2.0 - r;

    // Corner centers, each paired with the starting angle of its arc
    let corners = [
        (x + half_w, y + half_h, 0.0),
        (x - half_w, y + half_h, std::f32::consts::FRAC_PI_2),
        (x - half_w, y - half_h, std::f32::consts::PI),
        (x + half_w, y - half_h, std::f32::consts::PI * 1.5),
    ];

    let mut points = Vec::with_capacity(corners.len() * (segments + 1));
    for (cx, cy, start) in corners {
        for i in 0..=segments {
            let angle = start + std::f32::consts::FRAC_PI_2 * i as f32 / segments as f32;
            points.push((cx + r * angle.cos(), cy + r * angle.sin()));
        }
    }
    points
}

const CORNER_SEGMENTS: usize = 6;

/// `Canvas` over a nannou `Draw`
///
/// Switching blend mode swaps the working `Draw` for one derived from the
/// base with the matching color blend state.
pub struct NannouCanvas<'a> {
    base: &'a Draw,
    current: Draw,
    mode: BlendMode,
}

impl<'a> NannouCanvas<'a> {
    pub fn new(draw: &'a Draw) -> Self {
        Self {
            base: draw,
            current: draw.clone(),
            mode: BlendMode::Normal,
        }
    }

    fn color(color: Hsba) -> Rgba {
        let [r, g, b, a] = color.to_rgba();
        rgba(r, g, b, a)
    }
}

impl Canvas for NannouCanvas<'_> {
    fn blend_mode(&self) -> BlendMode {
        self.mode
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        if mode == self.mode {
            return;
        }
        self.current = match mode {
            BlendMode::Normal => self.base.color_blend(BLEND_NORMAL),
            BlendMode::Additive => self.base.color_blend(BLEND_ADD),
        };
        self.mode = mode;
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, corner_radius: f32, paint: Paint) {
        if corner_radius > 0.0 {
            let points = rounded_rect_points(x, y, w, h, corner_radius, CORNER_SEGMENTS);
            match paint {
                Paint::Fill(color) => {
                    self.current
                        .polygon()
                        .points(points.into_iter().map(|(px, py)| pt2(px, py)))
                        .color(Self::color(color));
                }
                Paint::Stroke { color, weight } => {
                    let mut closed = points;
                    if let Some(&first) = closed.first() {
                        closed.push(first);
                    }
                    self.polyline(&closed, weight, color);
                }
            }
            return;
        }

        match paint {
            Paint::Fill(color) => {
                self.current
                    .rect()
                    .x_y(x, y)
                    .w_h(w, h)
                    .color(Self::color(color));
            }
            Paint::Stroke { color, weight } => {
                self.current
                    .rect()
                    .x_y(x, y)
                    .w_h(w, h)
                    .no_fill()
                    .stroke(Self::color(color))
                    .stroke_weight(weight);
            }
        }
    }

    fn ellipse(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        match paint {
            Paint::Fill(color) => {
                self.current
                    .ellipse()
                    .x_y(x, y)
                    .w_h(w, h)
                    .color(Self::color(color));
            }
            Paint::Stroke { color, weight } => {
                self.current
                    .ellipse()
                    .x_y(x, y)
                    .w_h(w, h)
                    .no_fill()
                    .stroke(Self::color(color))
                    .stroke_weight(weight);
            }
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), weight: f32, color: Hsba) {
        self.current
            .line()
            .start(pt2(from.0, from.1))
            .end(pt2(to.0, to.1))
            .weight(weight)
            .color(Self::color(color));
    }

    fn polyline(&mut self, points: &[(f32, f32)], weight: f32, color: Hsba) {
        if points.len() < 2 {
            return;
        }
        let pts: Vec<Point2> = points.iter().map(|(x, y)| pt2(*x, *y)).collect();
        self.current
            .polyline()
            .weight(weight)
            .points(pts)
            .color(Self::color(color));
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: u32, color: Hsba) {
        // Wide layout box so prompts stay on one line
        let width = (text.chars().count() as f32 * size as f32).max(1.0);
        self.current
            .text(text)
            .x_y(x, y)
            .w_h(width, size as f32 * 2.0)
            .font_size(size)
            .color(Self::color(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ModeLog {
        mode: BlendMode,
        history: Vec<BlendMode>,
    }

    impl Canvas for ModeLog {
        fn blend_mode(&self) -> BlendMode {
            self.mode
        }
        fn set_blend_mode(&mut self, mode: BlendMode) {
            self.mode = mode;
            self.history.push(mode);
        }
        fn rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Paint) {}
        fn ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: Paint) {}
        fn line(&mut self, _: (f32, f32), _: (f32, f32), _: f32, _: Hsba) {}
        fn polyline(&mut self, _: &[(f32, f32)], _: f32, _: Hsba) {}
        fn text(&mut self, _: &str, _: f32, _: f32, _: u32, _: Hsba) {}
    }

    #[test]
    fn test_blend_scope_restores_normal() {
        let mut canvas = ModeLog::default();
        {
            let mut scope = BlendScope::new(&mut canvas, BlendMode::Additive);
            assert_eq!(scope.blend_mode(), BlendMode::Additive);
            scope.line((0.0, 0.0), (1.0, 1.0), 1.0, Hsba::WHITE);
        }
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
        assert_eq!(
            canvas.history,
            vec![BlendMode::Additive, BlendMode::Normal]
        );
    }

    #[test]
    fn test_blend_scope_through_trait_object() {
        let mut canvas = ModeLog::default();
        let dynamic: &mut dyn Canvas = &mut canvas;
        {
            let _scope = BlendScope::new(dynamic, BlendMode::Additive);
        }
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_hsba_primaries() {
        let red = Hsba::opaque(0.0, 100.0, 100.0).to_rgba();
        assert_eq!(red, [1.0, 0.0, 0.0, 1.0]);

        let blue = Hsba::new(240.0, 100.0, 100.0, 50.0).to_rgba();
        assert!((blue[2] - 1.0).abs() < 1e-6);
        assert!(blue[0].abs() < 1e-6);
        assert!((blue[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hsba_clamps_alpha_and_wraps_hue() {
        let c = Hsba::new(420.0, 100.0, 100.0, 200.0).to_rgba();
        let expected = Hsba::opaque(60.0, 100.0, 100.0).to_rgba();
        assert_eq!(c, expected);
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn test_rounded_rect_points_stay_inside_bounds() {
        let points = rounded_rect_points(0.0, 0.0, 400.0, 300.0, 30.0, 4);
        assert_eq!(points.len(), 20);
        for (x, y) in points {
            assert!(x.abs() <= 200.0 + 1e-3);
            assert!(y.abs() <= 150.0 + 1e-3);
        }
    }

    #[test]
    fn test_rounded_rect_radius_clamped() {
        let points = rounded_rect_points(0.0, 0.0, 20.0, 10.0, 100.0, 2);
        for (x, y) in points {
            assert!(x.abs() <= 10.0 + 1e-3);
            assert!(y.abs() <= 5.0 + 1e-3);
        }
    }
}
