// The in-memory song: which clips exist and which tracks play them.
// Nothing in here touches audio; the middle layer turns every change into
// AudioCommands for the engine.

mod kit;
mod sample;
#[cfg(test)]
pub mod test_fixture;
mod track;

pub use kit::{load_kit, KitConfig};
pub use track::TrackId;

use sample::SampleRegistry;
use track::TrackList;

use crate::audio::SampleId;
use crate::error::{LoopttyError, Result};
use crate::shared::clamp_volume;

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub samples: SampleRegistry,
    pub tracks: TrackList,
}

impl Session {
    pub fn with_tracks(n: usize) -> Self {
        Self {
            samples: SampleRegistry::default(),
            tracks: TrackList::with_tracks(n),
        }
    }

    // Returns the track's new length
    pub fn add_sample_to_track(&mut self, sample: SampleId, track: TrackId) -> Result<usize> {
        if !self.samples.contains(sample) {
            return Err(LoopttyError::SampleNotFound(sample));
        }
        self.tracks.add_sample(track, sample)
    }

    pub fn sequence(&self, track: TrackId) -> Result<Vec<SampleId>> {
        self.tracks
            .get(track)
            .map(|t| t.entries.clone())
            .ok_or(LoopttyError::TrackNotFound(track))
    }

    pub fn set_sample_volume(&mut self, sample: SampleId, volume: f32) -> Result<f32> {
        self.samples.set_volume(sample, volume)
    }

    // The track slider has no gain of its own: it rewrites the volume of every
    // sample on the track, so other tracks sharing those samples change too.
    // Returns the sample volumes the engine needs to hear about.
    pub fn set_track_volume(&mut self, track: TrackId, volume: f32) -> Result<Vec<(SampleId, f32)>> {
        let volume = clamp_volume(volume);
        let t = self.tracks.get_mut(track)?;
        t.volume = volume;

        let mut distinct: Vec<SampleId> = Vec::new();
        for &s in &t.entries {
            if !distinct.contains(&s) {
                distinct.push(s);
            }
        }

        distinct
            .into_iter()
            .map(|s| self.samples.set_volume(s, volume).map(|v| (s, v)))
            .collect()
    }
}
