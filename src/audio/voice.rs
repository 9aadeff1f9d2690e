use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// A playback cursor over one registered clip. The buffer itself lives in the
// engine's bank; the voice only remembers which clip and how far it got.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    pub sample_id: SampleId,
    pos: usize,
    active: bool,
}

impl Voice {
    pub fn new(sample_id: SampleId) -> Self {
        Self { sample_id, pos: 0, active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // Mix this voice into `out` at `gain`; returns how many frames were written.
    // Fewer frames than `out.len()` means the clip ended inside this block.
    pub fn render_into(&mut self, buffer: &SampleBuffer, gain: f32, out: &mut [StereoFrame]) -> usize {
        if !self.active {
            return 0;
        }
        let remaining = buffer.data.len().saturating_sub(self.pos);
        let n = remaining.min(out.len());

        let src = &buffer.data[self.pos..self.pos + n];
        for (frame, s) in out.iter_mut().zip(src) {
            frame.mix(*s, gain);
        }
        self.pos += n;

        if self.pos >= buffer.data.len() {
            self.active = false;
        }
        n
    }
}
