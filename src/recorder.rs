// Mic recording. The cpal input stream runs all the time (see audio/mod.rs);
// the recorder just decides whether the captured frames are kept.
use std::path::Path;

use tracing::info;

use crate::audio::StereoFrame;
use crate::error::{LoopttyError, Result};

#[derive(Debug)]
pub struct Recorder {
    sample_rate: u32,
    recording: bool,
    frames: Vec<StereoFrame>, // every take since startup, back to back
}

impl Recorder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, recording: false, frames: Vec::new() }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    #[cfg(test)]
    pub fn has_audio(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn recorded_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.sample_rate as f32
    }

    pub fn start(&mut self, input_available: bool) -> Result<()> {
        if !input_available {
            return Err(LoopttyError::NoInputDevice);
        }
        self.recording = true;
        info!("recording started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.recording {
            self.recording = false;
            info!(secs = self.recorded_secs(), "recording stopped");
        }
    }

    // Called with whatever the input stream delivered; dropped unless recording
    pub fn push(&mut self, chunk: &[StereoFrame]) {
        if self.recording {
            self.frames.extend_from_slice(chunk);
        }
    }

    // Writes everything recorded so far as 16-bit stereo WAV. The takes are
    // kept, so saving again later includes them too.
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.frames.is_empty() {
            return Err(LoopttyError::EmptyRecording);
        }
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for f in &self.frames {
            writer.write_sample(to_i16(f.left))?;
            writer.write_sample(to_i16(f.right))?;
        }
        writer.finalize()?;
        info!(path = %path.display(), secs = self.recorded_secs(), "recording saved");
        Ok(())
    }
}

fn to_i16(x: f32) -> i16 {
    (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(value: f32, len: usize) -> Vec<StereoFrame> {
        vec![StereoFrame::mono(value); len]
    }

    #[test]
    fn frames_are_dropped_unless_recording() {
        let mut rec = Recorder::new(1000);
        rec.push(&chunk(0.5, 10));
        assert!(!rec.has_audio());

        rec.start(true).unwrap();
        rec.push(&chunk(0.5, 10));
        rec.stop();
        rec.push(&chunk(0.5, 10));

        assert!(!rec.is_recording());
        assert!((rec.recorded_secs() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn takes_accumulate() {
        let mut rec = Recorder::new(1000);
        for _ in 0..2 {
            rec.start(true).unwrap();
            rec.push(&chunk(0.1, 500));
            rec.stop();
        }
        assert!((rec.recorded_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn start_without_mic_fails_and_stays_off() {
        let mut rec = Recorder::new(1000);
        assert!(matches!(rec.start(false), Err(LoopttyError::NoInputDevice)));
        assert!(!rec.is_recording());
    }

    #[test]
    fn saving_nothing_is_an_error() {
        let rec = Recorder::new(1000);
        let path = std::env::temp_dir().join("looptty-never-written.wav");
        assert!(matches!(rec.save(&path), Err(LoopttyError::EmptyRecording)));
        assert!(!path.exists());
    }

    #[test]
    fn saved_file_is_stereo_wav() {
        let mut rec = Recorder::new(8000);
        rec.start(true).unwrap();
        rec.push(&[StereoFrame { left: 1.0, right: -1.0 }, StereoFrame::mono(0.0)]);
        rec.stop();

        let path = std::env::temp_dir().join(format!("looptty-rec-{}.wav", std::process::id()));
        rec.save(&path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        std::fs::remove_file(&path).ok();

        assert_eq!((spec.channels, spec.sample_rate), (2, 8000));
        assert_eq!(samples, vec![i16::MAX, -i16::MAX, 0, 0]);
    }
}
