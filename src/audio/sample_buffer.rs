use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer as DecodeBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use super::frame::StereoFrame;
use crate::error::{LoopttyError, Result};

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>, // the audio data, already at the engine rate
}

impl SampleBuffer {
    #[cfg(test)]
    pub fn from_frames(data: Vec<StereoFrame>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f32 / sample_rate as f32
    }

    // WAV goes through hound, anything else (mp3, ogg, flac...) through symphonia
    pub fn load(path: &Path, target_rate: u32) -> Result<Self> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav {
            Self::load_wav(path, target_rate)
        } else {
            Self::decode(path, target_rate)
        }
    }

    pub fn load_wav(path: &Path, target_rate: u32) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, scale into -1..1
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        let frames = interleaved_to_frames(&samples, spec.channels as usize);
        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }

    pub fn decode(path: &Path, target_rate: u32) -> Result<Self> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LoopttyError::NoAudioTrack(path.to_path_buf()))?;
        let track_id = track.id;
        let file_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| LoopttyError::UnsupportedFormat("unknown sample rate".to_string()))?;

        let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut channels = 1;
        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }
            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => { // corrupt packet, skip it
                    tracing::debug!(path = %path.display(), msg, "skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let spec = *decoded.spec();
            channels = spec.channels.count();
            let mut buf = DecodeBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }

        let frames = interleaved_to_frames(&interleaved, channels);
        Ok(Self { data: resample_linear(&frames, file_rate, target_rate) })
    }
}

// mono is duplicated, anything wider than stereo keeps its first two channels
fn interleaved_to_frames(samples: &[f32], channels: usize) -> Vec<StereoFrame> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&x| StereoFrame::mono(x)).collect(),
        n => samples
            .chunks_exact(n)
            .map(|c| StereoFrame { left: c[0], right: c[1] })
            .collect(),
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames[frames.len() - 1];

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx + 1 >= frames.len() {
                return last;
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}
