use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};

use crate::audio_api::{AudioCommand, PlaybackEvent};

mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod track_player;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{next_sample_id, SampleId};

use engine::Engine;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    events_rx: Receiver<PlaybackEvent>,
    input_rx: Receiver<Vec<StereoFrame>>,
    retired_rx: Receiver<Vec<SampleId>>,
    sample_rate: u32,
    _output_stream: cpal::Stream,
    input_stream: Option<cpal::Stream>, // None when no mic available
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            warn!("audio command queue full, dropping command");
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn has_input(&self) -> bool {
        self.input_stream.is_some()
    }

    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        self.events_rx.try_iter().collect()
    }

    // Drops the sequences the engine replaced, off the audio thread
    pub fn free_retired(&self) {
        self.retired_rx.try_iter().for_each(drop);
    }

    // Everything the mic captured since the last call, in order
    pub fn drain_input(&self) -> impl Iterator<Item = Vec<StereoFrame>> + '_ {
        self.input_rx.try_iter()
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (events_tx, events_rx) = crossbeam_channel::bounded::<PlaybackEvent>(256);
    let (input_tx, input_rx) = crossbeam_channel::bounded::<Vec<StereoFrame>>(2048);
    let (retired_tx, retired_rx) = crossbeam_channel::bounded::<Vec<SampleId>>(256);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "opening output stream");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(&device, &config.into(), rx, events_tx, retired_tx, channels)?;
            output_stream.play().context("failed to play output stream")?;

            let input_stream = try_build_input_stream(&host, sample_rate, input_tx);

            Ok(AudioHandle {
                tx,
                events_rx,
                input_rx,
                retired_rx,
                sample_rate,
                _output_stream: output_stream,
                input_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 output is supported)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    events_tx: Sender<PlaybackEvent>,
    retired_tx: Sender<Vec<SampleId>>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    engine.set_events_tx(events_tx);
    engine.set_retired_tx(retired_tx);

    // grows to the largest block the host asks for, then stays put
    let mut scratch: Vec<StereoFrame> = Vec::with_capacity(4096);

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);
            write_interleaved(&scratch, data, channels);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

// stereo into however many channels the device has; extra channels get the mono mix
fn write_interleaved(frames: &[StereoFrame], data: &mut [f32], channels: usize) {
    if channels == 0 {
        return;
    }
    for (out, f) in data.chunks_exact_mut(channels).zip(frames) {
        match out {
            [mono] => *mono = (f.left + f.right) * 0.5,
            [l, r, rest @ ..] => {
                *l = f.left;
                *r = f.right;
                rest.fill((f.left + f.right) * 0.5);
            }
            [] => {}
        }
    }
}

// ── Input stream ──────────────────────────────────────────────────

fn try_build_input_stream(
    host: &cpal::Host,
    target_sample_rate: cpal::SampleRate,
    tx: Sender<Vec<StereoFrame>>,
) -> Option<cpal::Stream> {
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            warn!("no default input device, mic recording disabled");
            return None;
        }
    };

    let supported = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            warn!("no usable input config, mic recording disabled: {e}");
            return None;
        }
    };
    let mut stream_config: cpal::StreamConfig = supported.into();
    stream_config.sample_rate = target_sample_rate; // recorder writes at the engine rate

    let in_channels = (stream_config.channels as usize).max(1);

    let err_fn = |err| error!("audio input stream error: {err}");

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let frames: Vec<StereoFrame> = if in_channels == 1 {
                    data.iter().map(|&s| StereoFrame::mono(s)).collect()
                } else {
                    data.chunks_exact(in_channels)
                        .map(|c| StereoFrame { left: c[0], right: c[1] })
                        .collect()
                };
                let _ = tx.try_send(frames);
            },
            err_fn,
            None,
        )
        .inspect_err(|e| warn!("could not build input stream: {e}"))
        .ok()?;

    if let Err(e) = stream.play() {
        warn!("could not start input stream: {e}");
        return None;
    }

    info!(channels = in_channels, "mic input ready");
    Some(stream)
}
