// Purely for testing: a session with a few registered samples and the default track layout.

use crate::audio::SampleId;
use crate::shared::DEFAULT_TRACKS;

use super::Session;

pub const BASS: SampleId = SampleId(10_001);
pub const DRUM: SampleId = SampleId(10_002);
pub const PIANO: SampleId = SampleId(10_003);
pub const VIOLIN: SampleId = SampleId(10_004);

pub fn fixture_session() -> Session {
    let mut session = Session::with_tracks(DEFAULT_TRACKS);
    session.samples.register(BASS, "Bass", "Basses", 1.25);
    session.samples.register(DRUM, "Drum", "Drums", 0.5);
    session.samples.register(PIANO, "Piano", "Strings", 2.0);
    session.samples.register(VIOLIN, "Violin", "Strings", 3.5);
    session
}
