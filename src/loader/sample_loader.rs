use std::path::Path;

use crate::audio::{next_sample_id, SampleBuffer, SampleId};
use crate::error::{LoopttyError, Result};

// Decode a clip from disk and give it a fresh id, ready to register with the engine.
// A file that decodes to nothing is refused: a zero-length clip can't loop.
pub fn load(path: &Path, target_rate: u32) -> Result<(SampleId, SampleBuffer)> {
    let buffer = SampleBuffer::load(path, target_rate)?;
    if buffer.is_empty() {
        return Err(LoopttyError::EmptyClip(path.to_path_buf()));
    }
    let id = next_sample_id();
    tracing::debug!(path = %path.display(), frames = buffer.len(), ?id, "decoded sample");
    Ok((id, buffer))
}

// "strange-beat.mp3" -> "strange-beat"
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "New Sample".to_string())
}
