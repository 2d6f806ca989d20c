//! Window-space rectangle type

/// Center-anchored rectangle in window space (y grows upward)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_w_h(w: f32, h: f32) -> Self {
        Self { x: 0.0, y: 0.0, w, h }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn left(&self) -> f32 {
        self.x - self.w * 0.5
    }

    pub fn right(&self) -> f32 {
        self.x + self.w * 0.5
    }

    pub fn top(&self) -> f32 {
        self.y + self.h * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.y - self.h * 0.5
    }

    /// Length of the shorter side
    pub fn min_side(&self) -> f32 {
        self.w.min(self.h)
    }
}

impl From<nannou::geom::Rect> for Bounds {
    fn from(rect: nannou::geom::Rect) -> Self {
        Self::new(rect.x(), rect.y(), rect.w(), rect.h())
    }
}
