//! Frame composition: background, idle field, particles, rig, overlays.
//!
//! Draw order is fixed. Particle layers go down additively inside a
//! [`BlendScope`]; everything after them is drawn with normal blending.

pub mod boombox;
pub mod idle;
pub mod overlay;

use boombox_api::{BlendMode, BlendScope, Bounds, Canvas, Hsba, Paint};

use crate::audio::EnergySample;
use crate::renderer::particles::{Particle, Pool};
use crate::utils::Tick;

pub use overlay::{Anchor, Overlay};

/// Opacity of the black wash that leaves short trails
const WASH_ALPHA: f32 = 20.0;
/// Glow multiplier per frame without a beat
const GLOW_DECAY: f32 = 0.9;

/// Anything the composer can draw as one additive layer
pub trait Layer {
    fn render(&self, canvas: &mut dyn Canvas);
}

impl<P: Particle> Layer for Pool<P> {
    fn render(&self, canvas: &mut dyn Canvas) {
        Pool::render(self, canvas);
    }
}

/// Scene state that outlives a single frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneState {
    glow: f32,
    overlays: Vec<Overlay>,
}

impl SceneState {
    pub fn glow(&self) -> f32 {
        self.glow
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn show(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    /// Glow snaps to full on a beat and decays otherwise
    pub fn advance(&mut self, beat: bool, tick: Tick) {
        if beat {
            self.glow = 1.0;
        } else {
            self.glow *= tick.decay(GLOW_DECAY);
        }
        for overlay in &mut self.overlays {
            overlay.advance(tick);
        }
        self.overlays.retain(|o| !o.is_done());
    }

    pub fn clear(&mut self) {
        self.glow = 0.0;
        self.overlays.clear();
    }
}

/// What the frame shows besides the rig
pub enum Stage<'a> {
    /// No source: ambient field and the start prompt
    Idle,
    /// Live particle layers, back to front
    Active(&'a [&'a dyn Layer]),
}

/// Everything needed to draw one frame
pub struct Frame<'a> {
    pub bounds: Bounds,
    pub energy: EnergySample,
    pub frame: u64,
    pub stage: Stage<'a>,
    pub state: &'a SceneState,
}

/// Draw one frame; the canvas is left in normal blend mode
pub fn compose(canvas: &mut dyn Canvas, frame: &Frame) {
    let bounds = frame.bounds;
    canvas.set_blend_mode(BlendMode::Normal);

    canvas.rect(
        bounds.x,
        bounds.y,
        bounds.w,
        bounds.h,
        0.0,
        Paint::Fill(Hsba::BLACK.with_alpha(WASH_ALPHA)),
    );

    match frame.stage {
        Stage::Idle => idle::draw_field(canvas, bounds, frame.frame),
        Stage::Active(layers) => {
            let mut additive = BlendScope::new(&mut *canvas, BlendMode::Additive);
            for layer in layers {
                layer.render(&mut *additive);
            }
        }
    }

    boombox::draw_rig(canvas, bounds, &frame.energy, frame.state.glow());

    for overlay in frame.state.overlays() {
        overlay.render(canvas, bounds);
    }
    if let Stage::Idle = frame.stage {
        idle::draw_prompt(canvas, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Rect(BlendMode),
        Ellipse(BlendMode),
        Line(BlendMode),
        Text(String),
    }

    #[derive(Default)]
    struct Recorder {
        mode: BlendMode,
        ops: Vec<Op>,
    }

    impl Canvas for Recorder {
        fn blend_mode(&self) -> BlendMode {
            self.mode
        }
        fn set_blend_mode(&mut self, mode: BlendMode) {
            self.mode = mode;
        }
        fn rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Paint) {
            self.ops.push(Op::Rect(self.mode));
        }
        fn ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: Paint) {
            self.ops.push(Op::Ellipse(self.mode));
        }
        fn line(&mut self, _: (f32, f32), _: (f32, f32), _: f32, _: Hsba) {
            self.ops.push(Op::Line(self.mode));
        }
        fn polyline(&mut self, _: &[(f32, f32)], _: f32, _: Hsba) {}
        fn text(&mut self, text: &str, _: f32, _: f32, _: u32, _: Hsba) {
            self.ops.push(Op::Text(text.to_string()));
        }
    }

    /// Draws one additive line and checks the mode it was given
    struct Beam;

    impl Layer for Beam {
        fn render(&self, canvas: &mut dyn Canvas) {
            assert_eq!(canvas.blend_mode(), BlendMode::Additive);
            canvas.line((0.0, 0.0), (1.0, 1.0), 1.0, Hsba::WHITE);
        }
    }

    fn bounds() -> Bounds {
        Bounds::from_w_h(800.0, 600.0)
    }

    #[test]
    fn test_active_draw_order() {
        let mut state = SceneState::default();
        state.show(Overlay::pinned("hello"));
        let layers: [&dyn Layer; 2] = [&Beam, &Beam];
        let frame = Frame {
            bounds: bounds(),
            energy: EnergySample::SILENT,
            frame: 0,
            stage: Stage::Active(&layers),
            state: &state,
        };

        let mut canvas = Recorder {
            mode: BlendMode::Additive,
            ..Recorder::default()
        };
        compose(&mut canvas, &frame);

        assert_eq!(canvas.ops[0], Op::Rect(BlendMode::Normal));
        assert_eq!(canvas.ops[1], Op::Line(BlendMode::Additive));
        assert_eq!(canvas.ops[2], Op::Line(BlendMode::Additive));
        // rig follows in normal mode
        assert!(canvas.ops[3..canvas.ops.len() - 1]
            .iter()
            .all(|op| matches!(op, Op::Rect(BlendMode::Normal)
                | Op::Ellipse(BlendMode::Normal)
                | Op::Line(BlendMode::Normal))));
        assert_eq!(canvas.ops.last(), Some(&Op::Text("hello".to_string())));
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_idle_has_no_additive_pass_and_ends_with_prompt() {
        let state = SceneState::default();
        let frame = Frame {
            bounds: bounds(),
            energy: EnergySample::synthetic(10),
            frame: 10,
            stage: Stage::Idle,
            state: &state,
        };
        let mut canvas = Recorder::default();
        compose(&mut canvas, &frame);

        assert!(canvas
            .ops
            .iter()
            .all(|op| !matches!(op, Op::Rect(BlendMode::Additive)
                | Op::Ellipse(BlendMode::Additive)
                | Op::Line(BlendMode::Additive))));
        let texts: Vec<&Op> = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Text(_)))
            .collect();
        assert_eq!(texts.len(), idle::PROMPT.len());
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_glow_snaps_and_decays() {
        let mut state = SceneState::default();
        state.advance(true, Tick::FRAME);
        assert_eq!(state.glow(), 1.0);
        state.advance(false, Tick::FRAME);
        assert!((state.glow() - 0.9).abs() < 1e-6);
        state.advance(false, Tick::FRAME);
        assert!((state.glow() - 0.81).abs() < 1e-6);
    }

    #[test]
    fn test_finished_overlays_are_dropped() {
        let mut state = SceneState::default();
        state.show(Overlay::fading("bye", 0.5));
        state.show(Overlay::pinned("stay"));
        state.advance(false, Tick::FRAME);
        state.advance(false, Tick::FRAME);
        assert_eq!(state.overlays().len(), 1);
        assert_eq!(state.overlays()[0].text(), "stay");

        state.clear();
        assert!(state.overlays().is_empty());
        assert_eq!(state.glow(), 0.0);
    }
}
