// The key plan (resolved into semantic events by tui/input.rs):
//
// Sample palette:
//   Up / Down      //  SelectPrevSample / SelectNextSample
//   c              //  NextCategory
//   [ / ]          //  AdjustSampleVolume(-VOLUME_STEP or VOLUME_STEP)
//   Enter          //  AddSelectedSample (to the selected track)
//   1 .. 9         //  DropOnTrack(0 .. 8), the drag-and-drop path
//   u              //  opens the upload prompt, Enter submits UploadSample(path)
//
// Tracks:
//   Left / Right   //  SelectPrevTrack / SelectNextTrack
//   , / .          //  SelectPrevEntry / SelectNextEntry
//   Backspace      //  RemoveEntry
//   n              //  AddTrack
//   D              //  DeleteTrack
//   - / =          //  AdjustTrackVolume(-VOLUME_STEP or VOLUME_STEP)
//
// Transport + mic:
//   Space          //  PlayPress (play / stop every track loop)
//   r              //  RecordPress (start / stop the mic)
//   s              //  SaveRecording
//
// Quit:
//   Esc / q        //  Quit
//
// The middle layer owns the session and produces a DisplayState
// every frame; the TUI only draws what it is handed.

pub const DEFAULT_TRACKS: usize = 4;
pub const MAX_DROP_TARGETS: usize = 9;
pub const VOLUME_STEP: f32 = 0.05;
pub const MIN_VOLUME: f32 = 0.0;
pub const MAX_VOLUME: f32 = 1.0;
pub const UPLOAD_CATEGORY: &str = "Uploads";

pub fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() {
        return MAX_VOLUME;
    }
    v.clamp(MIN_VOLUME, MAX_VOLUME)
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // sample palette
    SelectPrevSample,
    SelectNextSample,
    NextCategory,
    AdjustSampleVolume(f32),
    AddSelectedSample,
    DropOnTrack(u8), // visible lane position, 0-based
    UploadSample(String),

    // tracks
    SelectPrevTrack,
    SelectNextTrack,
    SelectPrevEntry,
    SelectNextEntry,
    RemoveEntry,
    AddTrack,
    DeleteTrack,
    AdjustTrackVolume(f32),

    // transport + mic
    PlayPress,
    RecordPress,
    SaveRecording,

    Quit,
}

#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    pub category: Option<String>,
    pub samples: Vec<SampleRow>, // only the selected category
    pub selected_sample: Option<usize>, // index into `samples`
    pub tracks: Vec<TrackRow>,
    pub selected_track: Option<usize>, // index into `tracks`
    pub selected_entry: Option<usize>,
    pub playing: bool,
    pub recording: bool,
    pub recorded_secs: f32,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleRow {
    pub name: String,
    pub duration_secs: f32,
    pub volume: f32,
}

impl SampleRow {
    // "Bass (1.23s)"
    pub fn label(&self) -> String {
        format!("{} ({:.2}s)", self.name, self.duration_secs)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackRow {
    pub label: String,
    pub entries: Vec<String>,
    pub volume: f32,
    pub now_playing: Option<usize>, // entry index of the clip currently sounding
}
