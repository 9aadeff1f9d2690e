// The middle layer: owns the session, turns semantic input events into session
// edits plus the AudioCommands that keep the engine in sync, and builds the
// DisplayState the TUI draws every frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::audio::{SampleId, StereoFrame};
use crate::audio_api::{AudioCommand, PlaybackEvent};
use crate::error::{LoopttyError, Result};
use crate::loader::sample_loader;
use crate::recorder::Recorder;
use crate::session::{KitConfig, Session, TrackId};
use crate::shared::{DisplayState, InputEvent, SampleRow, TrackRow, UPLOAD_CATEGORY};

pub struct Middle {
    pub session: Session,
    recorder: Recorder,
    sample_rate: u32,
    input_available: bool,
    recording_path: PathBuf,

    category: usize, // index into session.samples.categories()
    selected_sample: usize, // index into the visible (filtered) samples
    selected_track: Option<TrackId>,
    selected_entry: usize,

    playing: bool,
    now_playing: HashMap<TrackId, usize>,
    status: String,
}

impl Middle {
    pub fn new(session: Session, sample_rate: u32, recording_path: PathBuf, input_available: bool) -> Self {
        let selected_track = session.tracks.by_position(0).map(|t| t.id);
        Self {
            session,
            recorder: Recorder::new(sample_rate),
            sample_rate,
            input_available,
            recording_path,
            category: 0,
            selected_sample: 0,
            selected_track,
            selected_entry: 0,
            playing: false,
            now_playing: HashMap::new(),
            status: String::new(),
        }
    }

    // Loads every kit sample that exists; missing or broken files are skipped
    pub fn load_kit(&mut self, kit: &KitConfig, project_dir: &Path) -> Vec<AudioCommand> {
        let mut cmds = Vec::new();
        for s in &kit.samples {
            let path = project_dir.join(&s.path);
            match self.load_sample(&path, &s.name, &s.category) {
                Ok(cmd) => cmds.push(cmd),
                Err(e) => warn!(path = %path.display(), "skipping kit sample: {e}"),
            }
        }
        info!(loaded = cmds.len(), of = kit.samples.len(), registered = self.session.samples.len(), "kit loaded");
        cmds
    }

    pub fn load_sample(&mut self, path: &Path, name: &str, category: &str) -> Result<AudioCommand> {
        let (id, buffer) = sample_loader::load(path, self.sample_rate)?;
        let duration = buffer.duration_secs(self.sample_rate);
        self.session.samples.register(id, name, category, duration);
        info!(name, category, duration, "registered sample");
        Ok(AudioCommand::RegisterSample { id, buffer })
    }

    // The status line only ever describes the latest input
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<AudioCommand> {
        self.status.clear();
        match self.apply(event) {
            Ok(cmds) => cmds,
            Err(e) => {
                warn!("{e}");
                self.status = e.to_string();
                Vec::new()
            }
        }
    }

    pub fn on_playback_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::ClipStarted { track, sample, index } => {
                if !self.playing {
                    return; // stale event from before a stop
                }
                let name = self
                    .session
                    .samples
                    .get(sample)
                    .map(|s| s.name.as_str())
                    .unwrap_or("?");
                info!("Starting: Track {}, instrument {}", track, name);
                self.now_playing.insert(track, index);
            }
        }
    }

    pub fn on_input_frames(&mut self, chunk: &[StereoFrame]) {
        self.recorder.push(chunk);
    }

    fn apply(&mut self, event: InputEvent) -> Result<Vec<AudioCommand>> {
        let cmds = match event {
            InputEvent::SelectPrevSample => {
                self.selected_sample = self.selected_sample.saturating_sub(1);
                vec![]
            }
            InputEvent::SelectNextSample => {
                let n = self.visible_samples().len();
                if self.selected_sample + 1 < n {
                    self.selected_sample += 1;
                }
                vec![]
            }
            InputEvent::NextCategory => {
                let n = self.session.samples.categories().len();
                if n > 0 {
                    self.category = (self.category + 1) % n;
                }
                self.selected_sample = 0;
                vec![]
            }
            InputEvent::AdjustSampleVolume(delta) => {
                let id = self.current_sample().ok_or(LoopttyError::NothingSelected("sample"))?;
                let current = self.session.samples.get(id).map(|s| s.volume).unwrap_or(1.0);
                let volume = self.session.set_sample_volume(id, current + delta)?;
                vec![AudioCommand::SetSampleVolume { id, volume }]
            }
            InputEvent::AddSelectedSample => {
                let track = self.current_track()?;
                self.add_to_track(track)?
            }
            InputEvent::DropOnTrack(pos) => {
                let track = self
                    .session
                    .tracks
                    .by_position(pos as usize)
                    .map(|t| t.id)
                    .ok_or(LoopttyError::NoSuchLane(pos as usize + 1))?;
                self.add_to_track(track)?
            }
            InputEvent::UploadSample(path) => self.upload(Path::new(path.trim()))?,
            InputEvent::SelectPrevTrack => {
                self.move_track_selection(-1);
                vec![]
            }
            InputEvent::SelectNextTrack => {
                self.move_track_selection(1);
                vec![]
            }
            InputEvent::SelectPrevEntry => {
                self.selected_entry = self.selected_entry.saturating_sub(1);
                vec![]
            }
            InputEvent::SelectNextEntry => {
                let len = self.current_track_len();
                if self.selected_entry + 1 < len {
                    self.selected_entry += 1;
                }
                vec![]
            }
            InputEvent::RemoveEntry => {
                let track = self.current_track()?;
                let removed = self.session.tracks.remove_entry(track, self.selected_entry)?;
                info!(%track, ?removed, "removed sample from track");
                self.selected_entry = self.selected_entry.min(self.current_track_len().saturating_sub(1));
                vec![self.sync_track(track)?]
            }
            InputEvent::AddTrack => {
                let track = self.session.tracks.add_track();
                info!(%track, "added track");
                self.selected_track = Some(track);
                self.selected_entry = 0;
                vec![self.sync_track(track)?]
            }
            InputEvent::DeleteTrack => {
                let track = self.current_track()?;
                let pos = self.session.tracks.position(track).unwrap_or(0);
                self.session.tracks.delete_track(track)?;
                self.now_playing.remove(&track);
                info!(%track, "deleted track");
                let len = self.session.tracks.len();
                self.selected_track = if len == 0 {
                    None
                } else {
                    self.session.tracks.by_position(pos.min(len - 1)).map(|t| t.id)
                };
                self.selected_entry = 0;
                vec![AudioCommand::RemoveTrack { track }]
            }
            InputEvent::AdjustTrackVolume(delta) => {
                let track = self.current_track()?;
                let current = self.session.tracks.get(track).map(|t| t.volume).unwrap_or(1.0);
                self.session
                    .set_track_volume(track, current + delta)?
                    .into_iter()
                    .map(|(id, volume)| AudioCommand::SetSampleVolume { id, volume })
                    .collect()
            }
            InputEvent::PlayPress => {
                self.now_playing.clear();
                self.playing = !self.playing;
                if self.playing {
                    info!("playing all tracks");
                    vec![AudioCommand::Play]
                } else {
                    info!("stopped");
                    vec![AudioCommand::Stop]
                }
            }
            InputEvent::RecordPress => {
                if self.recorder.is_recording() {
                    self.recorder.stop();
                    self.status = "Recording stopped".to_string();
                } else if let Err(e) = self.recorder.start(self.input_available) {
                    error!("Error accessing the microphone: {e}");
                    return Err(e);
                } else {
                    self.status = "Recording...".to_string();
                }
                vec![]
            }
            InputEvent::SaveRecording => {
                self.recorder.save(&self.recording_path)?;
                self.status = format!("Saved {}", self.recording_path.display());
                vec![]
            }
            InputEvent::Quit => vec![],
        };
        Ok(cmds)
    }

    fn add_to_track(&mut self, track: TrackId) -> Result<Vec<AudioCommand>> {
        let sample = self.current_sample().ok_or(LoopttyError::NothingSelected("sample"))?;
        let len = self.session.add_sample_to_track(sample, track)?;
        info!(%track, ?sample, len, "added sample to track");
        Ok(vec![self.sync_track(track)?])
    }

    fn upload(&mut self, path: &Path) -> Result<Vec<AudioCommand>> {
        let name = sample_loader::display_name(path);
        let cmd = self.load_sample(path, &name, UPLOAD_CATEGORY)?;
        // jump to the uploads so the new clip is visible and selected
        if let Some(i) = self
            .session
            .samples
            .categories()
            .iter()
            .position(|c| c == UPLOAD_CATEGORY)
        {
            self.category = i;
        }
        self.selected_sample = self.visible_samples().len().saturating_sub(1);
        self.status = format!("Uploaded {name}");
        Ok(vec![cmd])
    }

    fn sync_track(&self, track: TrackId) -> Result<AudioCommand> {
        Ok(AudioCommand::SetTrackSequence { track, samples: self.session.sequence(track)? })
    }

    fn move_track_selection(&mut self, step: isize) {
        let len = self.session.tracks.len();
        if len == 0 {
            return;
        }
        let pos = self
            .selected_track
            .and_then(|t| self.session.tracks.position(t))
            .unwrap_or(0);
        let next = (pos as isize + step).clamp(0, len as isize - 1) as usize;
        self.selected_track = self.session.tracks.by_position(next).map(|t| t.id);
        self.selected_entry = 0;
    }

    fn current_category(&self) -> Option<String> {
        self.session.samples.categories().into_iter().nth(self.category)
    }

    fn visible_samples(&self) -> Vec<SampleId> {
        match self.current_category() {
            Some(c) => self.session.samples.in_category(&c).map(|s| s.id).collect(),
            None => Vec::new(),
        }
    }

    fn current_sample(&self) -> Option<SampleId> {
        self.visible_samples().get(self.selected_sample).copied()
    }

    fn current_track(&self) -> Result<TrackId> {
        self.selected_track
            .ok_or(LoopttyError::NothingSelected("track"))
    }

    fn current_track_len(&self) -> usize {
        self.selected_track
            .and_then(|t| self.session.tracks.get(t))
            .map(|t| t.len())
            .unwrap_or(0)
    }

    pub fn display_state(&self) -> DisplayState {
        let category = self.current_category();
        let samples: Vec<SampleRow> = match &category {
            Some(c) => self
                .session
                .samples
                .in_category(c)
                .map(|s| SampleRow { name: s.name.clone(), duration_secs: s.duration_secs, volume: s.volume })
                .collect(),
            None => Vec::new(),
        };
        let selected_sample = (!samples.is_empty()).then(|| self.selected_sample.min(samples.len() - 1));

        let tracks: Vec<TrackRow> = self
            .session
            .tracks
            .iter()
            .map(|t| TrackRow {
                label: t.label(),
                entries: t
                    .entries
                    .iter()
                    .map(|id| self.session.samples.get(*id).map(|s| s.name.clone()).unwrap_or_default())
                    .collect(),
                volume: t.volume,
                now_playing: self.now_playing.get(&t.id).copied().filter(|&i| i < t.len()),
            })
            .collect();
        let selected_track = self.selected_track.and_then(|t| self.session.tracks.position(t));
        let selected_entry = (self.current_track_len() > 0).then_some(self.selected_entry);

        DisplayState {
            category,
            samples,
            selected_sample,
            tracks,
            selected_track,
            selected_entry,
            playing: self.playing,
            recording: self.recorder.is_recording(),
            recorded_secs: self.recorder.recorded_secs(),
            status: self.status.clone(),
        }
    }
}
