//! Slow ambient field shown while no audio source is running.

use boombox_api::{Bounds, Canvas, Hsba, Paint};

/// Grid pitch in pixels
const SPACING: f32 = 60.0;
const DOT: f32 = 4.0;

pub fn draw_field(canvas: &mut dyn Canvas, bounds: Bounds, frame: u64) {
    let t = frame as f32 * 0.03;
    let cols = (bounds.w / SPACING).ceil() as i32 + 1;
    let rows = (bounds.h / SPACING).ceil() as i32 + 1;
    let left = bounds.left();
    let bottom = bounds.bottom();

    for i in 0..cols {
        for j in 0..rows {
            let wave = (t + (i + j) as f32 * 0.5).sin();
            let size = DOT * (1.0 + 0.5 * wave);
            canvas.ellipse(
                left + i as f32 * SPACING,
                bottom + j as f32 * SPACING,
                size,
                size,
                Paint::Fill(Hsba::new(220.0 + 40.0 * wave, 50.0, 60.0, 20.0 + 10.0 * wave)),
            );
        }
    }
}

/// Prompt lines for the idle scene, top to bottom
pub const PROMPT: [&str; 2] = [
    "Drop a WAV file or press SPACE for live input",
    "1-9 preset tracks   R reset   Q quit",
];

pub fn draw_prompt(canvas: &mut dyn Canvas, bounds: Bounds) {
    let mut y = bounds.top() - 60.0;
    for (line, size) in PROMPT.iter().zip([28, 16]) {
        canvas.text(line, bounds.x, y, size, Hsba::opaque(0.0, 0.0, 90.0));
        y -= 36.0;
    }
}
