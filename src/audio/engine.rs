use std::collections::HashMap;

use crossbeam_channel::Sender;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::track_player::TrackPlayer;
use crate::audio_api::{AudioCommand, PlaybackEvent};
use crate::session::TrackId;
use crate::shared::clamp_volume;

// reserved up front so the audio callback doesn't malloc in the common case
const RESERVED_TRACKS: usize = 64;
const RESERVED_SAMPLES: usize = 256;

#[derive(Clone, Debug)]
pub struct BankEntry {
    pub buffer: SampleBuffer,
    pub volume: f32, // shared by every track that plays this sample
}

// Every registered clip, keyed by id
#[derive(Clone, Debug, Default)]
pub struct SampleBank {
    entries: HashMap<SampleId, BankEntry>,
}

impl SampleBank {
    pub fn with_capacity(n: usize) -> Self {
        Self { entries: HashMap::with_capacity(n) }
    }

    pub fn insert(&mut self, id: SampleId, buffer: SampleBuffer) {
        self.entries.insert(id, BankEntry { buffer, volume: 1.0 });
    }

    pub fn get(&self, id: SampleId) -> Option<&BankEntry> {
        self.entries.get(&id)
    }

    pub fn set_volume(&mut self, id: SampleId, volume: f32) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.volume = clamp_volume(volume);
                true
            }
            None => false,
        }
    }
}

// Lives on the audio thread. Owns the bank and one player per track; the UI
// only ever talks to it through AudioCommand.
pub struct Engine {
    bank: SampleBank,
    players: Vec<TrackPlayer>, // in track creation order
    events_tx: Option<Sender<PlaybackEvent>>,
    retired_tx: Option<Sender<Vec<SampleId>>>, // replaced sequences, freed on the UI thread
}

impl Engine {
    pub fn new() -> Self {
        Self {
            bank: SampleBank::with_capacity(RESERVED_SAMPLES),
            players: Vec::with_capacity(RESERVED_TRACKS),
            events_tx: None,
            retired_tx: None,
        }
    }

    pub fn set_events_tx(&mut self, tx: Sender<PlaybackEvent>) {
        self.events_tx = Some(tx);
    }

    pub fn set_retired_tx(&mut self, tx: Sender<Vec<SampleId>>) {
        self.retired_tx = Some(tx);
    }

    // If the channel is missing or full the Vec is dropped right here
    fn retire(&self, sequence: Vec<SampleId>) {
        if sequence.capacity() == 0 {
            return;
        }
        if let Some(tx) = &self.retired_tx {
            let _ = tx.try_send(sequence);
        }
    }

    #[cfg(test)]
    pub fn player(&self, track: TrackId) -> Option<&TrackPlayer> {
        self.players.iter().find(|p| p.track() == track)
    }

    fn player_mut(&mut self, track: TrackId) -> &mut TrackPlayer {
        let pos = match self.players.iter().position(|p| p.track() == track) {
            Some(pos) => pos,
            None => {
                self.players.push(TrackPlayer::new(track));
                self.players.len() - 1
            }
        };
        &mut self.players[pos]
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => self.bank.insert(id, buffer),
            AudioCommand::SetSampleVolume { id, volume } => {
                self.bank.set_volume(id, volume);
            }
            AudioCommand::SetTrackSequence { track, samples } => {
                let old = self.player_mut(track).set_sequence(samples);
                self.retire(old);
            }
            AudioCommand::RemoveTrack { track } => {
                if let Some(pos) = self.players.iter().position(|p| p.track() == track) {
                    let player = self.players.remove(pos);
                    self.retire(player.into_sequence());
                }
            }
            AudioCommand::Play => {
                // restarting rather than layering a second loop on top
                for player in &mut self.players {
                    player.start();
                }
            }
            AudioCommand::Stop => {
                for player in &mut self.players {
                    player.stop();
                }
            }
        }
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        let bank = &self.bank;
        let events_tx = &self.events_tx;
        let mut emit = |ev: PlaybackEvent| {
            if let Some(tx) = events_tx {
                let _ = tx.try_send(ev);
            }
        };
        for player in &mut self.players {
            player.render_into(bank, out, &mut emit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(value: f32, len: usize) -> SampleBuffer {
        SampleBuffer::from_frames(vec![StereoFrame::mono(value); len])
    }

    fn engine_with_two_tracks() -> Engine {
        let mut engine = Engine::new();
        engine.handle_cmd(AudioCommand::RegisterSample { id: SampleId(1), buffer: clip(0.25, 2) });
        engine.handle_cmd(AudioCommand::RegisterSample { id: SampleId(2), buffer: clip(0.5, 3) });
        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(0), samples: vec![SampleId(1)] });
        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(1), samples: vec![SampleId(2)] });
        engine
    }

    #[test]
    fn tracks_are_summed() {
        let mut engine = engine_with_two_tracks();
        engine.handle_cmd(AudioCommand::Play);

        let mut out = [StereoFrame::mono(9.0); 4];
        engine.render_block(&mut out);

        let left: Vec<f32> = out.iter().map(|f| f.left).collect();
        assert_eq!(left, vec![0.75, 0.75, 0.75, 0.75]);
    }

    #[test]
    fn silent_until_play_and_after_stop() {
        let mut engine = engine_with_two_tracks();
        let mut out = [StereoFrame::mono(9.0); 2];
        engine.render_block(&mut out);
        assert_eq!(out, [StereoFrame::zero(); 2]);

        engine.handle_cmd(AudioCommand::Play);
        engine.handle_cmd(AudioCommand::Stop);
        engine.render_block(&mut out);
        assert_eq!(out, [StereoFrame::zero(); 2]);
        assert!(engine.players.iter().all(|p| !p.is_running()));
    }

    #[test]
    fn sample_volume_applies_to_every_track_using_it() {
        let mut engine = Engine::new();
        engine.handle_cmd(AudioCommand::RegisterSample { id: SampleId(1), buffer: clip(1.0, 8) });
        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(0), samples: vec![SampleId(1)] });
        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(1), samples: vec![SampleId(1)] });
        engine.handle_cmd(AudioCommand::SetSampleVolume { id: SampleId(1), volume: 0.25 });
        engine.handle_cmd(AudioCommand::Play);

        let mut out = [StereoFrame::zero(); 2];
        engine.render_block(&mut out);

        assert_eq!(out[0], StereoFrame::mono(0.5));
    }

    #[test]
    fn volume_is_clamped() {
        let mut bank = SampleBank::default();
        bank.insert(SampleId(1), clip(1.0, 1));
        assert!(bank.set_volume(SampleId(1), 3.0));
        assert_eq!(bank.get(SampleId(1)).map(|e| e.volume), Some(1.0));
        assert!(bank.set_volume(SampleId(1), -1.0));
        assert_eq!(bank.get(SampleId(1)).map(|e| e.volume), Some(0.0));
        assert!(!bank.set_volume(SampleId(7), 0.5));
    }

    #[test]
    fn removed_track_stops_sounding() {
        let mut engine = engine_with_two_tracks();
        engine.handle_cmd(AudioCommand::Play);
        engine.handle_cmd(AudioCommand::RemoveTrack { track: TrackId(1) });

        let mut out = [StereoFrame::zero(); 2];
        engine.render_block(&mut out);

        assert_eq!(out[0], StereoFrame::mono(0.25));
        assert!(engine.player(TrackId(1)).is_none());
    }

    #[test]
    fn play_twice_restarts_instead_of_layering() {
        let mut engine = engine_with_two_tracks();
        engine.handle_cmd(AudioCommand::Play);
        let mut out = [StereoFrame::zero(); 1];
        engine.render_block(&mut out);
        engine.handle_cmd(AudioCommand::Play);
        engine.render_block(&mut out);

        assert_eq!(out[0], StereoFrame::mono(0.75));
        assert_eq!(engine.player(TrackId(1)).and_then(|p| p.now_playing()), Some(0));
    }

    #[test]
    fn clip_starts_are_reported() {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let mut engine = engine_with_two_tracks();
        engine.set_events_tx(tx);
        engine.handle_cmd(AudioCommand::Play);

        let mut out = [StereoFrame::zero(); 3];
        engine.render_block(&mut out);

        let events: Vec<PlaybackEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![
            PlaybackEvent::ClipStarted { track: TrackId(0), sample: SampleId(1), index: 0 },
            PlaybackEvent::ClipStarted { track: TrackId(0), sample: SampleId(1), index: 0 },
            PlaybackEvent::ClipStarted { track: TrackId(1), sample: SampleId(2), index: 0 },
        ]);
    }

    #[test]
    fn replaced_sequences_are_handed_back() {
        let (tx, rx) = crossbeam_channel::bounded(16);
        let mut engine = engine_with_two_tracks();
        engine.set_retired_tx(tx);

        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(0), samples: vec![SampleId(2)] });
        engine.handle_cmd(AudioCommand::RemoveTrack { track: TrackId(1) });
        engine.handle_cmd(AudioCommand::SetTrackSequence { track: TrackId(5), samples: vec![SampleId(1)] });

        let retired: Vec<Vec<SampleId>> = rx.try_iter().collect();
        assert_eq!(retired, vec![vec![SampleId(1)], vec![SampleId(2)]]);
    }

    #[test]
    fn players_are_reserved_up_front() {
        let engine = Engine::new();
        assert!(engine.players.capacity() >= RESERVED_TRACKS);
    }
}
