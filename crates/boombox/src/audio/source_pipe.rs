//! Live capture from an input device.
//!
//! The cpal callback downmixes to mono and appends to a bounded buffer; the
//! frame loop copies the tail out once per frame.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use super::{tail_window, SampleSource, SourceError, FFT_SIZE};

/// Samples kept between frames
const BUFFER_SIZE: usize = FFT_SIZE * 4;

pub struct LiveInput {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    sample_rate: f32,
    name: String,
    _stream: Stream,
}

impl LiveInput {
    /// Opens `device_name`, or the host's default input when `None`
    pub fn open(device_name: Option<&str>, timeout: Duration) -> Result<Self, SourceError> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(wanted) => host
                .input_devices()
                .ok()
                .and_then(|mut devices| {
                    devices.find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                })
                .ok_or_else(|| SourceError::UnknownDevice(wanted.to_string()))?,
            None => host.default_input_device().ok_or(SourceError::NoDevice)?,
        };
        let name = device.name().unwrap_or_else(|_| "input".to_string());

        let config = config_with_timeout(&device, true, timeout)?;
        let channels = config.channels.max(1) as usize;
        let buffer = Arc::new(Mutex::new(VecDeque::with_capacity(BUFFER_SIZE)));
        let writer = Arc::clone(&buffer);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buffer) = writer.lock() {
                    for frame in data.chunks(channels) {
                        if buffer.len() == BUFFER_SIZE {
                            buffer.pop_front();
                        }
                        buffer.push_back(frame.iter().sum::<f32>() / channels as f32);
                    }
                }
            },
            |err| tracing::warn!("Input stream error: {err}"),
            None,
        )?;
        stream.play()?;

        tracing::info!(device = %name, rate = config.sample_rate.0, channels, "Live input started");

        Ok(Self {
            buffer,
            sample_rate: config.sample_rate.0 as f32,
            name,
            _stream: stream,
        })
    }
}

impl SampleSource for LiveInput {
    fn window(&mut self, len: usize) -> Vec<f32> {
        match self.buffer.lock() {
            Ok(buffer) => {
                let samples: Vec<f32> = buffer.iter().copied().collect();
                tail_window(&samples, samples.len(), len)
            }
            Err(_) => vec![0.0; len],
        }
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Names of every input and output device on the default host
pub fn list_devices() -> Vec<String> {
    let host = cpal::default_host();
    let mut names = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        names.extend(inputs.filter_map(|d| d.name().ok()).map(|n| format!("{n} (input)")));
    }
    if let Ok(outputs) = host.output_devices() {
        names.extend(outputs.filter_map(|d| d.name().ok()).map(|n| format!("{n} (output)")));
    }
    names
}

/// Default stream config, queried on a helper thread.
///
/// Some backends hang forever on a broken device.
pub(crate) fn config_with_timeout(
    device: &Device,
    is_input: bool,
    timeout: Duration,
) -> Result<StreamConfig, SourceError> {
    let device = device.clone();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let config = if is_input {
            device.default_input_config()
        } else {
            device.default_output_config()
        };
        let _ = tx.send(config);
    });

    match rx.recv_timeout(timeout) {
        Ok(config) => Ok(config?.into()),
        Err(_) => Err(SourceError::Timeout(timeout)),
    }
}
