//! Per-frame band energy extraction.

use boombox_api::audio::{BASS, MID, TREBLE};
use boombox_api::{AudioFeed, BandRange, ENERGY_MAX};

/// Snapshot of one frame's energy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergySample {
    /// Bass band energy (0-255)
    pub bass: f32,
    /// Mid band energy (0-255)
    pub mid: f32,
    /// Treble band energy (0-255)
    pub treble: f32,
    /// Overall amplitude (0-1)
    pub level: f32,
}

impl EnergySample {
    pub const SILENT: EnergySample = EnergySample {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
        level: 0.0,
    };

    /// Build a sample, clamping each value to its scale. Non-finite values become 0.
    pub fn new(bass: f32, mid: f32, treble: f32, level: f32) -> Self {
        Self {
            bass: sanitize(bass, ENERGY_MAX),
            mid: sanitize(mid, ENERGY_MAX),
            treble: sanitize(treble, ENERGY_MAX),
            level: sanitize(level, 1.0),
        }
    }

    /// Oscillating stand-in energy for the idle scene
    pub fn synthetic(frame: u64) -> Self {
        let t = frame as f32;
        let bass = 90.0 + 60.0 * (t * 0.04).sin();
        let mid = 80.0 + 40.0 * (t * 0.027 + 1.0).sin();
        let treble = 60.0 + 30.0 * (t * 0.061 + 2.0).sin();
        Self::new(bass, mid, treble, bass / ENERGY_MAX * 0.3)
    }
}

impl Default for EnergySample {
    fn default() -> Self {
        Self::SILENT
    }
}

fn sanitize(value: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Frequency ranges for the three bands
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandRanges {
    pub bass: BandRange,
    pub mid: BandRange,
    pub treble: BandRange,
}

impl Default for BandRanges {
    fn default() -> Self {
        Self {
            bass: BASS,
            mid: MID,
            treble: TREBLE,
        }
    }
}

/// Named band lookup; names map onto the configured explicit ranges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Bass,
    Mid,
    Treble,
}

impl BandRanges {
    pub fn range(&self, band: Band) -> BandRange {
        match band {
            Band::Bass => self.bass,
            Band::Mid => self.mid,
            Band::Treble => self.treble,
        }
    }
}

/// Run one analysis pass on the feed and read the banded energies.
///
/// An empty spectrum yields a silent sample.
pub fn extract(feed: &mut dyn AudioFeed, ranges: &BandRanges) -> EnergySample {
    if feed.analyze_spectrum().is_empty() {
        return EnergySample::SILENT;
    }

    let feed: &dyn AudioFeed = feed;
    let energy = |band: Band| {
        let range = ranges.range(band);
        feed.band_energy(range.low_hz, range.high_hz)
    };

    EnergySample::new(
        energy(Band::Bass),
        energy(Band::Mid),
        energy(Band::Treble),
        feed.amplitude_level(),
    )
}
