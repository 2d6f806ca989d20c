//! Spectrum analysis and FFT processing.
//!
//! Turns a window of time-domain samples into a smoothed magnitude spectrum
//! on the 0-255 byte scale, answers band-energy queries over it, and tracks
//! the RMS amplitude of the window.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::utils::ConfigError;

/// FFT size. At 44.1kHz this gives ~21.5 Hz bins, enough to split the bass band.
pub const FFT_SIZE: usize = 2048;

/// dB window mapped onto 0-255
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Tuning for `SpectrumAnalyzer`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalyzerConfig {
    /// Share of the previous magnitude kept each frame, in [0, 1)
    pub smoothing: f32,
    /// Number of output bins (1 to FFT_SIZE / 2)
    pub bins: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.8,
            bins: FFT_SIZE / 2,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing >= 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if self.bins == 0 || self.bins > FFT_SIZE / 2 {
            return Err(ConfigError::Bins(self.bins));
        }
        Ok(())
    }
}

pub struct SpectrumAnalyzer {
    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_window: Vec<f32>,

    sample_rate: f32,
    smoothing: f32,
    /// FFT bins folded into each output bin
    group: usize,

    /// Smoothed linear magnitudes, one per output bin
    magnitudes: Vec<f32>,
    /// Byte-scaled spectrum handed out to callers
    spectrum: Vec<f32>,
    level: f32,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f32, config: AnalyzerConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Pre-compute Hann window
        let fft_window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();

        let bins = config.bins.clamp(1, FFT_SIZE / 2);

        Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            fft_window,
            sample_rate,
            smoothing: config.smoothing.clamp(0.0, 0.99),
            group: (FFT_SIZE / 2) / bins,
            magnitudes: vec![0.0; bins],
            spectrum: vec![0.0; bins],
            level: 0.0,
        }
    }

    /// Analyze the most recent samples. Call once per frame.
    ///
    /// Uses the last `FFT_SIZE` samples, zero-padding shorter windows.
    pub fn process(&mut self, samples: &[f32]) -> &[f32] {
        let window = &samples[samples.len().saturating_sub(FFT_SIZE)..];

        // RMS level, ignoring non-finite samples
        let (sum_sq, count) = window
            .iter()
            .filter(|s| s.is_finite())
            .fold((0.0f32, 0usize), |(acc, n), s| (acc + s * s, n + 1));
        self.level = if count > 0 {
            (sum_sq / count as f32).sqrt().clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Apply window and fill buffer (reusing pre-allocated buffer)
        for i in 0..FFT_SIZE {
            let sample = window.get(i).copied().filter(|s| s.is_finite()).unwrap_or(0.0);
            self.fft_buffer[i] = Complex::new(sample * self.fft_window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        for (i, magnitude) in self.magnitudes.iter_mut().enumerate() {
            let start = i * self.group;
            let current = self.fft_buffer[start..start + self.group]
                .iter()
                .map(|c| c.norm() / FFT_SIZE as f32)
                .sum::<f32>()
                / self.group as f32;

            *magnitude = *magnitude * self.smoothing + current * (1.0 - self.smoothing);

            let db = 20.0 * (*magnitude + 1e-10).log10();
            self.spectrum[i] = ((db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0).clamp(0.0, 255.0);
        }

        &self.spectrum
    }

    /// RMS amplitude of the last processed window (0-1)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Width of one output bin in Hz
    fn bin_width(&self) -> f32 {
        self.sample_rate / 2.0 / self.spectrum.len() as f32
    }

    /// Clamp a fractional bin position to a valid index
    fn clamp_bin(&self, idx: f32) -> usize {
        if idx.is_finite() {
            (idx.max(0.0) as usize).min(self.spectrum.len() - 1)
        } else {
            0
        }
    }

    /// Average of the byte spectrum over bins centered in `[low_hz, high_hz]` (0-255).
    ///
    /// A range narrower than one bin reads the bin nearest its midpoint.
    pub fn band_energy(&self, low_hz: f32, high_hz: f32) -> f32 {
        let (low_hz, high_hz) = if low_hz <= high_hz {
            (low_hz, high_hz)
        } else {
            (high_hz, low_hz)
        };
        let width = self.bin_width();
        let first = (low_hz / width).ceil();
        let last = (high_hz / width).floor();

        let (low, high) = if first <= last {
            (self.clamp_bin(first), self.clamp_bin(last))
        } else {
            let nearest = self.clamp_bin(((low_hz + high_hz) / 2.0 / width).round());
            (nearest, nearest)
        };

        let bins = &self.spectrum[low..=high];
        bins.iter().sum::<f32>() / bins.len() as f32
    }
}
