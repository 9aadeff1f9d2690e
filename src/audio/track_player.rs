use super::engine::SampleBank;
use super::frame::StereoFrame;
use super::sample_id::SampleId;
use super::voice::Voice;
use crate::audio_api::PlaybackEvent;
use crate::session::TrackId;

// The looping driver for one track. Every track gets its own player and they
// never coordinate: each one advances on its own clip ending, so tracks with
// different clip lengths drift freely against each other.
#[derive(Clone, Debug)]
pub struct TrackPlayer {
    track: TrackId,
    sequence: Vec<SampleId>,
    cursor: Option<usize>, // index of the clip last started, None = next start is index 0
    voice: Option<Voice>,
    running: bool,
    parked: bool, // a whole pass produced no audio; wait for the next edit or play
}

impl TrackPlayer {
    pub fn new(track: TrackId) -> Self {
        Self {
            track,
            sequence: Vec::new(),
            cursor: None,
            voice: None,
            running: false,
            parked: false,
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // index of the clip currently sounding
    #[cfg(test)]
    pub fn now_playing(&self) -> Option<usize> {
        self.voice.and(self.cursor)
    }

    // Replacing the sequence never cuts the clip that is sounding; the next
    // clip is picked from the new sequence when it ends. Hands back the old
    // sequence so the caller decides where it gets freed.
    pub fn set_sequence(&mut self, sequence: Vec<SampleId>) -> Vec<SampleId> {
        if sequence.is_empty() {
            self.cursor = None;
        }
        self.parked = false;
        std::mem::replace(&mut self.sequence, sequence)
    }

    pub fn into_sequence(self) -> Vec<SampleId> {
        self.sequence
    }

    // Tracks that are empty when play is pressed stay stopped.
    pub fn start(&mut self) {
        self.cursor = None;
        self.voice = None;
        self.running = !self.sequence.is_empty();
        self.parked = false;
    }

    pub fn stop(&mut self) {
        self.cursor = None;
        self.voice = None;
        self.running = false;
        self.parked = false;
    }

    fn next_index(&self) -> usize {
        match self.cursor {
            Some(c) if c + 1 < self.sequence.len() => c + 1,
            _ => 0,
        }
    }

    pub fn render_into(
        &mut self,
        bank: &SampleBank,
        out: &mut [StereoFrame],
        emit: &mut impl FnMut(PlaybackEvent),
    ) {
        if !self.running || self.parked {
            return;
        }

        let mut offset = 0;
        let mut silent_starts = 0; // clips started in a row that produced no audio
        while offset < out.len() {
            if self.voice.is_none() {
                if self.sequence.is_empty() {
                    return;
                }
                if silent_starts >= self.sequence.len() {
                    self.parked = true;
                    return;
                }
                let index = self.next_index();
                let sample = self.sequence[index];
                self.cursor = Some(index);
                self.voice = Some(Voice::new(sample));
                emit(PlaybackEvent::ClipStarted { track: self.track, sample, index });
            }
            let Some(voice) = self.voice.as_mut() else {
                return;
            };

            let written = match bank.get(voice.sample_id) {
                Some(entry) => voice.render_into(&entry.buffer, entry.volume, &mut out[offset..]),
                None => 0, // never registered, treat as an empty clip
            };
            offset += written;

            let finished = !voice.is_active() || written == 0;
            if finished {
                self.voice = None;
                if written == 0 {
                    silent_starts += 1;
                } else {
                    silent_starts = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleBuffer;

    fn clip(value: f32, len: usize) -> SampleBuffer {
        SampleBuffer::from_frames(vec![StereoFrame::mono(value); len])
    }

    fn bank_with(clips: &[(u64, f32, usize)]) -> SampleBank {
        let mut bank = SampleBank::default();
        for &(id, value, len) in clips {
            bank.insert(SampleId(id), clip(value, len));
        }
        bank
    }

    fn render(player: &mut TrackPlayer, bank: &SampleBank, frames: usize) -> (Vec<f32>, Vec<usize>) {
        let mut out = vec![StereoFrame::zero(); frames];
        let mut started = Vec::new();
        player.render_into(bank, &mut out, &mut |ev| {
            let PlaybackEvent::ClipStarted { index, .. } = ev;
            started.push(index);
        });
        (out.iter().map(|f| f.left).collect(), started)
    }

    #[test]
    fn plays_in_order_and_wraps_to_first_clip() {
        let bank = bank_with(&[(1, 1.0, 3), (2, 2.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        player.start();

        let (out, started) = render(&mut player, &bank, 10);

        assert_eq!(out, vec![1.0, 1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(started, vec![0, 1, 0, 1]);
    }

    #[test]
    fn clip_spanning_blocks_is_not_restarted() {
        let bank = bank_with(&[(1, 1.0, 6)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1)]);
        player.start();

        let (_, first) = render(&mut player, &bank, 4);
        let (_, second) = render(&mut player, &bank, 4);

        assert_eq!(first, vec![0]);
        assert_eq!(second, vec![0]); // second start is the wrap at frame 6
        assert_eq!(player.now_playing(), Some(0));
    }

    #[test]
    fn not_started_until_play() {
        let bank = bank_with(&[(1, 1.0, 4)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1)]);

        let (out, started) = render(&mut player, &bank, 4);

        assert!(out.iter().all(|&x| x == 0.0));
        assert!(started.is_empty());
    }

    #[test]
    fn empty_track_does_not_start() {
        let mut player = TrackPlayer::new(TrackId(0));
        player.start();
        assert!(!player.is_running());
    }

    #[test]
    fn live_edit_takes_effect_after_current_clip() {
        let bank = bank_with(&[(1, 1.0, 2), (2, 2.0, 2), (3, 3.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        player.start();

        let (out, _) = render(&mut player, &bank, 1);
        assert_eq!(out, vec![1.0]);

        player.set_sequence(vec![SampleId(1), SampleId(3)]);
        let (out, started) = render(&mut player, &bank, 5);

        assert_eq!(out, vec![1.0, 3.0, 3.0, 1.0, 1.0]);
        assert_eq!(started, vec![1, 0]);
    }

    #[test]
    fn shrinking_past_cursor_wraps_to_zero() {
        let bank = bank_with(&[(1, 1.0, 1), (2, 2.0, 1), (3, 3.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(2), SampleId(3)]);
        player.start();
        render(&mut player, &bank, 3); // now inside clip index 2

        player.set_sequence(vec![SampleId(2)]);
        let (out, started) = render(&mut player, &bank, 2);

        assert_eq!(out, vec![3.0, 2.0]);
        assert_eq!(started, vec![0]);
    }

    #[test]
    fn emptied_track_goes_silent_then_restarts_from_zero() {
        let bank = bank_with(&[(1, 1.0, 2), (2, 2.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        player.start();
        render(&mut player, &bank, 3); // inside clip index 1

        player.set_sequence(Vec::new());
        let (out, started) = render(&mut player, &bank, 3);
        assert_eq!(out, vec![2.0, 0.0, 0.0]);
        assert!(started.is_empty());

        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        let (out, started) = render(&mut player, &bank, 2);
        assert_eq!(out, vec![1.0, 1.0]);
        assert_eq!(started, vec![0]);
    }

    #[test]
    fn zero_length_clips_are_skipped() {
        let bank = bank_with(&[(1, 1.0, 0), (2, 2.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        player.start();

        let (out, _) = render(&mut player, &bank, 4);

        assert_eq!(out, vec![2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn all_silent_sequence_does_not_spin() {
        let bank = bank_with(&[(1, 1.0, 0)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1), SampleId(1), SampleId(99)]);
        player.start();

        let (out, started) = render(&mut player, &bank, 8);

        assert!(out.iter().all(|&x| x == 0.0));
        assert_eq!(started.len(), 3);
    }

    #[test]
    fn all_silent_sequence_stays_quiet_across_blocks() {
        let bank = bank_with(&[(1, 1.0, 0)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1)]);
        player.start();

        let mut total = 0;
        for _ in 0..100 {
            let (out, started) = render(&mut player, &bank, 512);
            assert!(out.iter().all(|&x| x == 0.0));
            total += started.len();
        }

        assert_eq!(total, 1);
    }

    #[test]
    fn parked_track_resumes_after_an_edit() {
        let bank = bank_with(&[(1, 1.0, 0), (2, 2.0, 2)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1)]);
        player.start();
        render(&mut player, &bank, 4);
        let (_, started) = render(&mut player, &bank, 4);
        assert!(started.is_empty());

        player.set_sequence(vec![SampleId(1), SampleId(2)]);
        let (out, started) = render(&mut player, &bank, 3);

        assert_eq!(out, vec![2.0, 2.0, 2.0]);
        assert_eq!(started, vec![1, 0, 1]);
    }

    #[test]
    fn set_sequence_returns_the_replaced_one() {
        let mut player = TrackPlayer::new(TrackId(0));
        assert!(player.set_sequence(vec![SampleId(1)]).is_empty());
        assert_eq!(player.set_sequence(vec![SampleId(2)]), vec![SampleId(1)]);
        assert_eq!(player.into_sequence(), vec![SampleId(2)]);
    }

    #[test]
    fn stop_silences_the_loop() {
        let bank = bank_with(&[(1, 1.0, 4)]);
        let mut player = TrackPlayer::new(TrackId(0));
        player.set_sequence(vec![SampleId(1)]);
        player.start();
        render(&mut player, &bank, 2);

        player.stop();
        let (out, _) = render(&mut player, &bank, 2);

        assert_eq!(out, vec![0.0, 0.0]);
        assert_eq!(player.now_playing(), None);
    }
}
