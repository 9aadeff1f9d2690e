pub use crate::audio::{SampleBuffer, SampleId};
use crate::session::TrackId;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (it would stall the audio thread), so clips
    // are decoded up front (see sample_loader.rs) and handed over here
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // Volume lives on the shared sample handle, not on the track
    SetSampleVolume { id: SampleId, volume: f32 },

    // Always the full sequence; the engine never sees partial edits
    SetTrackSequence { track: TrackId, samples: Vec<SampleId> },
    RemoveTrack { track: TrackId },

    Play,
    Stop,
}

// engine -> ui, drained once per frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    ClipStarted { track: TrackId, sample: SampleId, index: usize },
}
