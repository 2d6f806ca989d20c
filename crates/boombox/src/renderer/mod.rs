pub mod particles;
pub mod scene;

use boombox_api::{AudioFeed, Bounds, Canvas};
use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::utils::BeatDetector;
use crate::audio::{extract, EnergySample};
use crate::utils::{ConfigError, Settings, Tick};
use particles::{Ember, LaserBeam, Pool, Ring};
use scene::{Anchor, Frame, Layer, Overlay, SceneState, Stage};

const GREETING: &str = "Enjoying the beats?";
const GREETING_FADE: f32 = 2.0 / 255.0;
const NOW_PLAYING_FRAMES: u32 = 180;
const NOTIFICATION_FRAMES: u32 = 120;
/// Laser hue base rotation in degrees per frame
const HUE_DRIFT: f32 = 0.6;
/// Ember origin below the window center, as a share of the shorter side
const EMBER_DROP: f32 = 0.15;

/// Window settings for the app shell
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Resolution {
    pub fn windowed() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }

    pub fn current(windowed: bool) -> Self {
        if windowed || cfg!(debug_assertions) {
            Self::windowed()
        } else {
            Self {
                fullscreen: true,
                ..Self::windowed()
            }
        }
    }
}

/// Everything one experience mutates, cleared as a unit on reset
#[derive(Clone, Debug, PartialEq)]
struct Session {
    detector: BeatDetector,
    rings: Pool<Ring>,
    lasers: Pool<LaserBeam>,
    embers: Pool<Ember>,
    scene: SceneState,
    hue_base: f32,
    energy: EnergySample,
    beat: bool,
}

impl Session {
    fn new(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            detector: BeatDetector::new(settings.beat)?,
            rings: Pool::new(settings.rings.ceiling),
            lasers: Pool::new(settings.lasers.ceiling),
            embers: Pool::new(settings.embers.ceiling),
            scene: SceneState::default(),
            hue_base: 0.0,
            energy: EnergySample::SILENT,
            beat: false,
        })
    }

    fn clear(&mut self) {
        self.detector.reset();
        self.rings.clear();
        self.lasers.clear();
        self.embers.clear();
        self.scene.clear();
        self.hue_base = 0.0;
        self.energy = EnergySample::SILENT;
        self.beat = false;
    }
}

/// Drives the animation: idle until a feed is installed, then
/// energy → beat → spawns → particles, once per frame.
pub struct Renderer {
    settings: Settings,
    rng: StdRng,
    feed: Option<Box<dyn AudioFeed>>,
    /// Frames since launch; keeps running across experiences
    frame: u64,
    session: Session,
}

impl Renderer {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = Session::new(&settings)?;

        Ok(Self {
            settings,
            rng,
            feed: None,
            frame: 0,
            session,
        })
    }

    /// Begin reacting to `feed`, replacing any running experience
    pub fn start_experience(&mut self, feed: Box<dyn AudioFeed>, title: Option<&str>) {
        self.reset();
        self.feed = Some(feed);

        self.session.scene.show(
            Overlay::fading(GREETING, GREETING_FADE)
                .at(Anchor::Top(100.0))
                .size(32),
        );
        if let Some(title) = title {
            self.session
                .scene
                .show(Overlay::held(format!("Now playing: {title}"), NOW_PLAYING_FRAMES));
        }

        tracing::info!(title = title.unwrap_or("live input"), "Experience started");
    }

    /// Short status banner, e.g. a source that failed to open
    pub fn notify(&mut self, text: impl Into<String>) {
        self.session.scene.show(Overlay::held(text, NOTIFICATION_FRAMES).at(Anchor::Top(40.0)));
    }

    pub fn is_active(&self) -> bool {
        self.feed.is_some()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Energy shown on the last frame (synthetic while idle)
    pub fn energy(&self) -> EnergySample {
        self.session.energy
    }

    pub fn update(&mut self, bounds: Bounds, tick: Tick) {
        self.frame += 1;

        let ended = match &self.feed {
            None => {
                self.session.energy = EnergySample::synthetic(self.frame);
                self.session.scene.advance(false, tick);
                return;
            }
            Some(feed) => feed.ended(),
        };
        if ended {
            tracing::info!("Track finished");
            self.reset();
            return;
        }
        let Some(feed) = self.feed.as_deref_mut() else {
            return;
        };

        let session = &mut self.session;
        let energy = extract(feed, &self.settings.bands);
        let beat = session.detector.process(energy.bass);
        session.hue_base = (session.hue_base + tick.step(HUE_DRIFT)).rem_euclid(360.0);

        let center = vec2(bounds.x, bounds.y);
        session.rings.spawn(Ring::burst(
            energy.bass,
            center,
            &self.settings.rings,
            &mut self.rng,
        ));
        if beat {
            tracing::debug!(bass = energy.bass, cutoff = session.detector.cutoff(), "Beat");
            session.lasers.spawn(LaserBeam::burst(
                energy.bass,
                center,
                session.hue_base,
                &self.settings.lasers,
                &mut self.rng,
            ));
            let origin = center - vec2(0.0, bounds.min_side() * EMBER_DROP);
            session.embers.spawn(Ember::burst(
                energy.bass,
                origin,
                &self.settings.embers,
                &mut self.rng,
            ));
        }

        session.rings.advance(tick);
        session.lasers.advance(tick);
        session.embers.advance(tick);
        session.scene.advance(beat, tick);

        session.energy = energy;
        session.beat = beat;
    }

    /// Pure function of current state
    pub fn draw(&self, canvas: &mut dyn Canvas, bounds: Bounds) {
        let layers: [&dyn Layer; 3] = [
            &self.session.rings,
            &self.session.lasers,
            &self.session.embers,
        ];
        let stage = if self.is_active() {
            Stage::Active(&layers)
        } else {
            Stage::Idle
        };

        scene::compose(
            canvas,
            &Frame {
                bounds,
                energy: self.session.energy,
                frame: self.frame,
                stage,
                state: &self.session.scene,
            },
        );
    }

    pub fn render_frame(&mut self, canvas: &mut dyn Canvas, bounds: Bounds, tick: Tick) {
        self.update(bounds, tick);
        self.draw(canvas, bounds);
    }

    /// Back to idle. Safe to call any number of times.
    pub fn reset(&mut self) {
        if self.feed.take().is_some() {
            tracing::info!("Experience stopped");
        }
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boombox_api::{BlendMode, Hsba, Paint};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Plays back a fixed bass script, then reports the end
    struct ScriptedFeed {
        bass: Vec<f32>,
        cursor: usize,
        spectrum: Vec<f32>,
        analyses: Rc<Cell<usize>>,
        ends: bool,
    }

    impl ScriptedFeed {
        fn new(bass: Vec<f32>, analyses: Rc<Cell<usize>>) -> Self {
            Self {
                bass,
                cursor: 0,
                spectrum: vec![0.0; 8],
                analyses,
                ends: false,
            }
        }

        fn current(&self) -> f32 {
            self.bass.get(self.cursor.saturating_sub(1)).copied().unwrap_or(0.0)
        }
    }

    impl AudioFeed for ScriptedFeed {
        fn analyze_spectrum(&mut self) -> &[f32] {
            self.analyses.set(self.analyses.get() + 1);
            self.cursor += 1;
            &self.spectrum
        }

        fn band_energy(&self, low_hz: f32, _high_hz: f32) -> f32 {
            if low_hz < 140.0 {
                self.current()
            } else {
                0.0
            }
        }

        fn amplitude_level(&self) -> f32 {
            self.current() / 255.0
        }

        fn ended(&self) -> bool {
            self.ends && self.cursor >= self.bass.len()
        }
    }

    struct NullCanvas(BlendMode);

    impl Canvas for NullCanvas {
        fn blend_mode(&self) -> BlendMode {
            self.0
        }
        fn set_blend_mode(&mut self, mode: BlendMode) {
            self.0 = mode;
        }
        fn rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Paint) {}
        fn ellipse(&mut self, _: f32, _: f32, _: f32, _: f32, _: Paint) {}
        fn line(&mut self, _: (f32, f32), _: (f32, f32), _: f32, _: Hsba) {}
        fn polyline(&mut self, _: &[(f32, f32)], _: f32, _: Hsba) {}
        fn text(&mut self, _: &str, _: f32, _: f32, _: u32, _: Hsba) {}
    }

    fn seeded() -> Renderer {
        Renderer::new(Settings {
            seed: Some(42),
            ..Settings::default()
        })
        .unwrap()
    }

    fn bounds() -> Bounds {
        Bounds::from_w_h(1280.0, 720.0)
    }

    fn scripted() -> Vec<f32> {
        let mut bass = vec![30.0, 60.0, 200.0];
        bass.extend(std::iter::repeat(40.0).take(300));
        bass
    }

    #[test]
    fn test_idle_never_analyzes() {
        let mut renderer = seeded();
        let mut canvas = NullCanvas(BlendMode::Normal);
        for _ in 0..120 {
            renderer.render_frame(&mut canvas, bounds(), Tick::FRAME);
        }
        assert!(!renderer.is_active());
        assert_eq!(renderer.frame(), 120);
        assert!(renderer.session.rings.is_empty());
        assert!(renderer.session.lasers.is_empty());
        assert!(renderer.session.embers.is_empty());
        assert_eq!(renderer.energy(), EnergySample::synthetic(120));
        assert_eq!(canvas.blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn test_scripted_bass_gives_one_beat() {
        let analyses = Rc::new(Cell::new(0));
        let mut renderer = seeded();
        renderer.start_experience(Box::new(ScriptedFeed::new(scripted(), analyses.clone())), None);

        let mut beats = Vec::new();
        for frame in 0..scripted().len() {
            renderer.update(bounds(), Tick::FRAME);
            if renderer.session.beat {
                beats.push(frame);
            }
        }

        assert_eq!(beats, vec![2]);
        assert_eq!(analyses.get(), scripted().len());
        assert_eq!(renderer.session.detector.cutoff(), 170.0);
        // lasers and embers only come from the single beat
        assert!(renderer.session.lasers.is_empty());
        assert!(renderer.session.embers.is_empty());
    }

    #[test]
    fn test_beat_spawns_all_effects() {
        let analyses = Rc::new(Cell::new(0));
        let mut renderer = seeded();
        renderer.start_experience(
            Box::new(ScriptedFeed::new(vec![255.0], analyses)),
            Some("demo"),
        );
        renderer.update(bounds(), Tick::FRAME);

        assert!(renderer.session.beat);
        assert_eq!(renderer.session.rings.len(), 4);
        assert_eq!(renderer.session.lasers.len(), 16);
        assert_eq!(renderer.session.embers.len(), 24);
        assert_eq!(renderer.session.scene.glow(), 1.0);
        let texts: Vec<&str> = renderer.session.scene.overlays().iter().map(|o| o.text()).collect();
        assert_eq!(texts, vec![GREETING, "Now playing: demo"]);
    }

    #[test]
    fn test_ceilings_hold_under_bursts() {
        let mut settings = Settings {
            seed: Some(3),
            ..Settings::default()
        };
        settings.rings.ceiling = 3;
        settings.lasers.ceiling = 5;
        settings.embers.ceiling = 7;
        let mut renderer = Renderer::new(settings).unwrap();

        // A beat every 40 frames, loud bass in between
        let bass: Vec<f32> = (0..400)
            .map(|i| if i % 40 == 0 { 255.0 } else { 120.0 })
            .collect();
        let analyses = Rc::new(Cell::new(0));
        renderer.start_experience(Box::new(ScriptedFeed::new(bass, analyses)), None);

        renderer.update(bounds(), Tick::FRAME);
        assert_eq!(renderer.session.lasers.len(), 5);
        assert_eq!(renderer.session.embers.len(), 7);
        for _ in 1..400 {
            renderer.update(bounds(), Tick::FRAME);
            let session = &renderer.session;
            assert!(session.rings.len() <= 3);
            assert!(session.lasers.len() <= 5);
            assert!(session.embers.len() <= 7);
        }
    }

    #[test]
    fn test_end_of_track_returns_to_idle() {
        let analyses = Rc::new(Cell::new(0));
        let mut feed = ScriptedFeed::new(vec![255.0, 100.0], analyses.clone());
        feed.ends = true;
        let mut renderer = seeded();
        renderer.start_experience(Box::new(feed), Some("short"));

        renderer.update(bounds(), Tick::FRAME);
        renderer.update(bounds(), Tick::FRAME);
        assert!(renderer.is_active());

        renderer.update(bounds(), Tick::FRAME);
        assert!(!renderer.is_active());
        assert!(renderer.session.rings.is_empty());
        assert!(renderer.session.scene.overlays().is_empty());

        for _ in 0..10 {
            renderer.update(bounds(), Tick::FRAME);
        }
        assert_eq!(analyses.get(), 2);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let analyses = Rc::new(Cell::new(0));
        let mut renderer = seeded();
        renderer.start_experience(Box::new(ScriptedFeed::new(scripted(), analyses)), None);
        for _ in 0..10 {
            renderer.update(bounds(), Tick::FRAME);
        }

        renderer.reset();
        let once = renderer.session.clone();
        renderer.reset();
        assert_eq!(renderer.session, once);
        assert!(!renderer.is_active());
        assert_eq!(renderer.session.detector.cutoff(), 170.0);
    }

    #[test]
    fn test_hue_base_drifts() {
        let analyses = Rc::new(Cell::new(0));
        let mut renderer = seeded();
        renderer.start_experience(Box::new(ScriptedFeed::new(vec![0.0; 10], analyses)), None);
        for _ in 0..10 {
            renderer.update(bounds(), Tick::FRAME);
        }
        assert!((renderer.session.hue_base - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_notification_expires_while_idle() {
        let mut renderer = seeded();
        renderer.notify("Live input unavailable");
        assert_eq!(renderer.session.scene.overlays().len(), 1);
        for _ in 0..400 {
            renderer.update(bounds(), Tick::FRAME);
        }
        assert!(renderer.session.scene.overlays().is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.beat.decay_rate = 0.0;
        assert!(matches!(
            Renderer::new(settings),
            Err(ConfigError::DecayRate(_))
        ));
    }
}
