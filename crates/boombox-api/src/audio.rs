//! Audio analysis boundary consumed by the animation core

/// Upper end of the legacy byte energy scale used by band queries
pub const ENERGY_MAX: f32 = 255.0;

/// Inclusive frequency range in Hz
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BandRange {
    pub low_hz: f32,
    pub high_hz: f32,
}

impl BandRange {
    pub const fn new(low_hz: f32, high_hz: f32) -> Self {
        Self { low_hz, high_hz }
    }

    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.low_hz && hz <= self.high_hz
    }
}

/// Default explicit ranges; the named bands resolve to these
pub const BASS: BandRange = BandRange::new(20.0, 140.0);
pub const MID: BandRange = BandRange::new(140.0, 2000.0);
pub const TREBLE: BandRange = BandRange::new(2000.0, 8000.0);

/// A live, analyzed audio source.
///
/// `analyze_spectrum` must be called once per frame before the band and
/// level queries; those answer from the most recent analysis.
pub trait AudioFeed {
    /// Run one analysis pass and return the magnitude spectrum (0-255 per bin)
    fn analyze_spectrum(&mut self) -> &[f32];

    /// Average spectrum energy between `low_hz` and `high_hz` (0-255)
    fn band_energy(&self, low_hz: f32, high_hz: f32) -> f32;

    /// Overall amplitude of the latest sample window (0-1)
    fn amplitude_level(&self) -> f32;

    /// True once the source has played to its end
    fn ended(&self) -> bool {
        false
    }
}
