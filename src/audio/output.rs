// Audio output - playback through cpal
//
// Opens the default output device at 44100 Hz mono and drains the shared
// sample ring from the device callback. The callback only touches the
// ring, so it returns in bounded time; underflow comes out as silence.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use std::sync::Arc;

use super::ring::SampleRing;
use crate::apu::constants::SAMPLE_RATE;

/// Live audio output stream
pub struct AudioOutput {
    _device: Device,
    stream: Stream,
    ring: Arc<SampleRing>,
}

impl AudioOutput {
    /// Open the default device and start draining the ring
    pub fn new(ring: Arc<SampleRing>, volume: f32) -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("no audio output device available")?;

        log::info!(
            target: "famicore::apu",
            "audio device: {}",
            device.name().unwrap_or_else(|_| "unknown".into())
        );

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let callback_ring = Arc::clone(&ring);
        let volume = volume.clamp(0.0, 1.0);
        let mut scratch = vec![0i16; 1024];

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0);
                    }
                    callback_ring.pop(&mut scratch[..data.len()]);
                    for (out, &sample) in data.iter_mut().zip(&scratch) {
                        *out = sample as f32 / 32768.0 * volume;
                    }
                },
                |err| {
                    log::error!(target: "famicore::apu", "audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| format!("failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("failed to start audio stream: {}", e))?;

        Ok(AudioOutput {
            _device: device,
            stream,
            ring,
        })
    }

    /// Stop playback and release the device
    pub fn shutdown(self) {
        self.ring.shutdown();
        drop(self.stream);
    }
}
