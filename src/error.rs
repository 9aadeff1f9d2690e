//! Error types for looptty

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::SampleId;
use crate::session::TrackId;

#[derive(Debug, Error)]
pub enum LoopttyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Decoding error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("No audio track found in {0}")]
    NoAudioTrack(PathBuf),
    #[error("No audio in {0}")]
    EmptyClip(PathBuf),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Kit config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("Sample not found: {0:?}")]
    SampleNotFound(SampleId),
    #[error("Track {track} has no entry {index}")]
    EntryNotFound { track: TrackId, index: usize },
    #[error("No {0} selected")]
    NothingSelected(&'static str),
    #[error("No track in lane {0}")]
    NoSuchLane(usize),
    #[error("No audio input device available")]
    NoInputDevice,
    #[error("Nothing has been recorded")]
    EmptyRecording,
}

pub type Result<T> = std::result::Result<T, LoopttyError>;
