//! WAV tracks: background decoding and playback through the default output.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::source_pipe::config_with_timeout;
use super::{tail_window, SampleSource, SourceError};

/// A fully decoded track, downmixed to mono
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTrack {
    pub title: String,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn decode(path: &Path) -> Result<Self, SourceError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / full_scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        if samples.is_empty() {
            return Err(SourceError::EmptyTrack);
        }

        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_string());

        Ok(Self {
            title,
            samples,
            sample_rate: spec.sample_rate,
        })
    }
}

/// Decode `path` on a worker thread; poll the receiver with `try_recv`
pub fn spawn_load(path: PathBuf) -> Receiver<Result<DecodedTrack, SourceError>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        tracing::debug!(path = %path.display(), "Decoding track");
        let _ = tx.send(DecodedTrack::decode(&path));
    });
    rx
}

/// Read position into a track, advanced by the output callback
#[derive(Debug)]
pub(crate) struct Playhead {
    samples: Arc<[f32]>,
    /// Fractional sample index
    position: f64,
    /// Track samples consumed per output frame
    step: f64,
    ended: Arc<AtomicBool>,
}

impl Playhead {
    pub(crate) fn new(samples: Arc<[f32]>, track_rate: u32, device_rate: u32) -> Self {
        Self {
            samples,
            position: 0.0,
            step: track_rate as f64 / device_rate.max(1) as f64,
            ended: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fill an interleaved output buffer, flagging the end once the track runs out
    pub(crate) fn fill(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let sample = self.samples.get(self.position as usize).copied();
            match sample {
                Some(s) => {
                    frame.fill(s);
                    self.position += self.step;
                }
                None => {
                    frame.fill(0.0);
                    self.ended.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    pub(crate) fn window(&self, len: usize) -> Vec<f32> {
        tail_window(&self.samples, self.position as usize, len)
    }

    pub(crate) fn ended(&self) -> bool {
        self.ended.load(Ordering::Relaxed)
    }
}

/// A decoded track playing on the default output device
pub struct TrackPlayer {
    playhead: Arc<Mutex<Playhead>>,
    ended: Arc<AtomicBool>,
    sample_rate: f32,
    title: String,
    _stream: Stream,
}

impl TrackPlayer {
    pub fn play(track: DecodedTrack, timeout: Duration) -> Result<Self, SourceError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(SourceError::NoDevice)?;
        let config = config_with_timeout(&device, false, timeout)?;
        let channels = config.channels.max(1) as usize;

        let playhead = Playhead::new(track.samples.into(), track.sample_rate, config.sample_rate.0);
        let ended = Arc::clone(&playhead.ended);
        let playhead = Arc::new(Mutex::new(playhead));
        let writer = Arc::clone(&playhead);

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match writer.lock() {
                Ok(mut playhead) => playhead.fill(data, channels),
                Err(_) => data.fill(0.0),
            },
            |err| tracing::warn!("Output stream error: {err}"),
            None,
        )?;
        stream.play()?;

        tracing::info!(
            title = %track.title,
            track_rate = track.sample_rate,
            device_rate = config.sample_rate.0,
            "Track playing"
        );

        Ok(Self {
            playhead,
            ended,
            sample_rate: track.sample_rate as f32,
            title: track.title,
            _stream: stream,
        })
    }
}

impl SampleSource for TrackPlayer {
    fn window(&mut self, len: usize) -> Vec<f32> {
        match self.playhead.lock() {
            Ok(playhead) => playhead.window(len),
            Err(_) => vec![0.0; len],
        }
    }

    /// Analysis runs on the track's own samples, not the resampled output
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn ended(&self) -> bool {
        self.ended.load(Ordering::Relaxed)
    }

    fn name(&self) -> &str {
        &self.title
    }
}
