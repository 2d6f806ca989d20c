mod analyzer;
pub mod energy;
mod source_pipe;
pub mod track;
pub mod utils;

use boombox_api::AudioFeed;
use std::time::Duration;

pub use analyzer::{AnalyzerConfig, SpectrumAnalyzer, FFT_SIZE};
pub use energy::{extract, Band, BandRanges, EnergySample};
pub use source_pipe::{list_devices, LiveInput};
pub use track::{spawn_load, DecodedTrack, TrackPlayer};

/// Why an audio source could not be started
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no default audio device")]
    NoDevice,
    #[error("no audio device named {0:?}")]
    UnknownDevice(String),
    #[error("device config query failed: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("device config query timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("failed to decode track: {0}")]
    Decode(#[from] hound::Error),
    #[error("track has no samples")]
    EmptyTrack,
    #[error("track loader stopped before finishing")]
    LoaderGone,
}

/// Raw mono samples from a device or a track
pub trait SampleSource {
    /// The most recent `len` samples, zero-padded at the front when short
    fn window(&mut self, len: usize) -> Vec<f32>;

    fn sample_rate(&self) -> f32;

    /// True once a finite source has played out
    fn ended(&self) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// A sample source wired to a spectrum analyzer
pub struct AudioInput<S> {
    source: S,
    analyzer: SpectrumAnalyzer,
}

impl<S: SampleSource> AudioInput<S> {
    pub fn new(source: S, config: AnalyzerConfig) -> Self {
        let analyzer = SpectrumAnalyzer::new(source.sample_rate(), config);
        Self { source, analyzer }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: SampleSource> AudioFeed for AudioInput<S> {
    fn analyze_spectrum(&mut self) -> &[f32] {
        let samples = self.source.window(FFT_SIZE);
        self.analyzer.process(&samples)
    }

    fn band_energy(&self, low_hz: f32, high_hz: f32) -> f32 {
        self.analyzer.band_energy(low_hz, high_hz)
    }

    fn amplitude_level(&self) -> f32 {
        self.analyzer.level()
    }

    fn ended(&self) -> bool {
        self.source.ended()
    }
}

/// Zero-padded tail of `samples` ending at `end`
pub(crate) fn tail_window(samples: &[f32], end: usize, len: usize) -> Vec<f32> {
    let end = end.min(samples.len());
    let start = end.saturating_sub(len);
    let mut window = vec![0.0; len - (end - start)];
    window.extend_from_slice(&samples[start..end]);
    window
}
