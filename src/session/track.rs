use std::fmt;

use crate::audio::SampleId;
use crate::error::{LoopttyError, Result};
use crate::shared::MAX_VOLUME;

// Stable key for a track. Handed out once by TrackList and never reused, so
// deleting one track can't shift another track's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub entries: Vec<SampleId>, // play order, duplicates allowed
    pub volume: f32,            // last value of the track slider
}

impl Track {
    fn new(id: TrackId) -> Self {
        Self { id, entries: Vec::new(), volume: MAX_VOLUME }
    }

    // "Track 3", fixed at creation and never renumbered
    pub fn label(&self) -> String {
        format!("Track {}", self.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>, // display order
    next_id: u32,
}

impl TrackList {
    pub fn with_tracks(n: usize) -> Self {
        let mut list = Self::default();
        for _ in 0..n {
            list.add_track();
        }
        list
    }

    pub fn add_track(&mut self) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.push(Track::new(id));
        id
    }

    pub fn delete_track(&mut self, id: TrackId) -> Result<Track> {
        let pos = self.position(id).ok_or(LoopttyError::TrackNotFound(id))?;
        Ok(self.tracks.remove(pos))
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TrackId) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LoopttyError::TrackNotFound(id))
    }

    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn by_position(&self, pos: usize) -> Option<&Track> {
        self.tracks.get(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    // Returns the track's new length
    pub fn add_sample(&mut self, track: TrackId, sample: SampleId) -> Result<usize> {
        let t = self.get_mut(track)?;
        t.entries.push(sample);
        Ok(t.entries.len())
    }

    pub fn remove_entry(&mut self, track: TrackId, index: usize) -> Result<SampleId> {
        let t = self.get_mut(track)?;
        if index >= t.entries.len() {
            return Err(LoopttyError::EntryNotFound { track, index });
        }
        Ok(t.entries.remove(index))
    }
}
