//! cpal-backed microphone collaborator.
//!
//! Samples arrive on the audio thread and cross to the session loop through
//! a bounded channel; dropping the stream stops the hardware track.

use super::{AudioCapture, MediaError, Microphone};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Microphone backed by the platform's default audio host.
pub struct CpalMicrophone {
    device_hint: Option<String>,
}

impl CpalMicrophone {
    #[must_use]
    pub fn new(device_hint: Option<&str>) -> Self {
        Self {
            device_hint: device_hint.map(str::to_string),
        }
    }
}

impl Microphone for CpalMicrophone {
    fn open(&mut self) -> Result<Box<dyn AudioCapture>, MediaError> {
        let host = cpal::default_host();
        let device = resolve_input_device(&host, self.device_hint.as_deref())?;
        let supported = device
            .default_input_config()
            .map_err(|err| MediaError::AccessDenied(format!("input config: {err}")))?;

        let sample_format = supported.sample_format();
        let stream_config = supported.config();
        let sample_rate = stream_config.sample_rate.0;
        let channels = usize::from(stream_config.channels.max(1));
        let (tx, rx) = bounded::<Vec<f32>>(FRAME_CHANNEL_CAPACITY);

        let error_callback = |err| {
            tracing::warn!(error = %err, "live input stream error");
        };

        let stream = match sample_format {
            SampleFormat::F32 => {
                let tx = tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[f32], _| push_frame(&tx, interleaved_to_mono(data, channels)),
                        error_callback,
                        None,
                    )
                    .map_err(|err| MediaError::AccessDenied(format!("f32 input stream: {err}")))?
            }
            SampleFormat::I16 => {
                let tx = tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[i16], _| {
                            let floats: Vec<f32> =
                                data.iter().map(|s| f32::from(*s) / f32::from(i16::MAX)).collect();
                            push_frame(&tx, interleaved_to_mono(&floats, channels));
                        },
                        error_callback,
                        None,
                    )
                    .map_err(|err| MediaError::AccessDenied(format!("i16 input stream: {err}")))?
            }
            SampleFormat::U16 => {
                let tx = tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[u16], _| {
                            let floats: Vec<f32> = data
                                .iter()
                                .map(|s| (f32::from(*s) / f32::from(u16::MAX)) * 2.0 - 1.0)
                                .collect();
                            push_frame(&tx, interleaved_to_mono(&floats, channels));
                        },
                        error_callback,
                        None,
                    )
                    .map_err(|err| MediaError::AccessDenied(format!("u16 input stream: {err}")))?
            }
            other => {
                return Err(MediaError::AccessDenied(format!(
                    "unsupported input sample format: {other:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|err| MediaError::AccessDenied(format!("start input stream: {err}")))?;

        Ok(Box::new(CpalCapture {
            stream: Some(stream),
            rx,
            sample_rate,
        }))
    }

    fn device_name(&self) -> String {
        let host = cpal::default_host();
        resolve_input_device(&host, self.device_hint.as_deref())
            .ok()
            .and_then(|device| device.name().ok())
            .unwrap_or_else(|| "Unknown Device".to_string())
    }
}

struct CpalCapture {
    stream: Option<Stream>,
    rx: Receiver<Vec<f32>>,
    sample_rate: u32,
}

impl AudioCapture for CpalCapture {
    fn drain(&mut self) -> Vec<f32> {
        let mut samples = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(frame) => samples.extend(frame),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        samples
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn release(&mut self) {
        // Dropping the cpal stream stops the hardware track; repeated calls
        // find the slot already empty.
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

/// Names of available input devices, for diagnostics and device pickers.
pub(super) fn input_device_names() -> Vec<String> {
    let host = cpal::default_host();
    let Ok(devices) = host.input_devices() else {
        return Vec::new();
    };
    devices
        .enumerate()
        .map(|(index, device)| {
            device
                .name()
                .unwrap_or_else(|_| format!("Microphone {}", index + 1))
        })
        .collect()
}

fn resolve_input_device(
    host: &cpal::Host,
    device_hint: Option<&str>,
) -> Result<cpal::Device, MediaError> {
    if let Some(hint) = device_hint {
        let trimmed = hint.trim();
        if !trimmed.is_empty() {
            let devices = host
                .input_devices()
                .map_err(|err| MediaError::AccessDenied(format!("enumerate devices: {err}")))?
                .collect::<Vec<_>>();
            if let Ok(index) = trimmed.parse::<usize>() {
                if let Some(device) = devices.into_iter().nth(index) {
                    return Ok(device);
                }
                return Err(MediaError::AccessDenied(format!(
                    "microphone not found for index {trimmed}"
                )));
            }
            for device in devices {
                if device.name().is_ok_and(|name| name == trimmed) {
                    return Ok(device);
                }
            }
            return Err(MediaError::AccessDenied(format!(
                "microphone not found: {trimmed}"
            )));
        }
    }

    host.default_input_device()
        .ok_or_else(|| MediaError::AccessDenied("no input microphone is available".to_string()))
}

fn push_frame(tx: &Sender<Vec<f32>>, frame: Vec<f32>) {
    // Audio thread never blocks; a full channel drops the oldest pressure.
    let _ = tx.try_send(frame);
}

fn interleaved_to_mono(input: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return input.to_vec();
    }
    let mut output = Vec::with_capacity(input.len() / channels);
    for frame in input.chunks_exact(channels) {
        let sum = frame.iter().copied().sum::<f32>();
        output.push(sum / channels as f32);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_input_passes_through() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(interleaved_to_mono(&input, 1), input);
    }

    #[test]
    fn averages_interleaved_channels_to_mono() {
        let stereo = vec![0.2_f32, 0.6_f32, -0.2_f32, 0.2_f32];
        let mono = interleaved_to_mono(&stereo, 2);
        assert_eq!(mono, vec![0.4_f32, 0.0_f32]);
    }

    #[test]
    fn push_frame_drops_when_channel_full() {
        let (tx, rx) = bounded::<Vec<f32>>(1);
        push_frame(&tx, vec![0.1]);
        push_frame(&tx, vec![0.2]);
        assert_eq!(rx.try_recv().expect("first frame"), vec![0.1]);
        assert!(rx.try_recv().is_err(), "second frame was dropped");
    }
}
