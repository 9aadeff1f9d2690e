use std::time::Duration;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crate::shared::{InputEvent, MAX_DROP_TARGETS, VOLUME_STEP};
use super::mode::TuiState;

// poll for input, resolve keys (and the upload prompt) into semantic events for the middle layer
pub fn poll_input(timeout: Duration, ts: &mut TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code, ts));
    }
    Ok(vec![])
}

pub fn handle_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    if ts.prompt_open() {
        return handle_prompt_key(code, ts);
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayPress],

        // sample palette
        KeyCode::Up => vec![InputEvent::SelectPrevSample],
        KeyCode::Down => vec![InputEvent::SelectNextSample],
        KeyCode::Char('c') => vec![InputEvent::NextCategory],
        KeyCode::Char('[') => vec![InputEvent::AdjustSampleVolume(-VOLUME_STEP)],
        KeyCode::Char(']') => vec![InputEvent::AdjustSampleVolume(VOLUME_STEP)],
        KeyCode::Enter => vec![InputEvent::AddSelectedSample],
        KeyCode::Char(c @ '1'..='9') => drop_target(c).map_or(vec![], |n| vec![InputEvent::DropOnTrack(n)]),
        KeyCode::Char('u') => {
            ts.upload_prompt = Some(String::new());
            vec![]
        }

        // tracks
        KeyCode::Left => vec![InputEvent::SelectPrevTrack],
        KeyCode::Right => vec![InputEvent::SelectNextTrack],
        KeyCode::Char(',') => vec![InputEvent::SelectPrevEntry],
        KeyCode::Char('.') => vec![InputEvent::SelectNextEntry],
        KeyCode::Backspace | KeyCode::Delete => vec![InputEvent::RemoveEntry],
        KeyCode::Char('n') => vec![InputEvent::AddTrack],
        KeyCode::Char('D') => vec![InputEvent::DeleteTrack],
        KeyCode::Char('-') => vec![InputEvent::AdjustTrackVolume(-VOLUME_STEP)],
        KeyCode::Char('=') => vec![InputEvent::AdjustTrackVolume(VOLUME_STEP)],

        // mic
        KeyCode::Char('r') => vec![InputEvent::RecordPress],
        KeyCode::Char('s') => vec![InputEvent::SaveRecording],

        _ => vec![],
    }
}

fn handle_prompt_key(code: KeyCode, ts: &mut TuiState) -> Vec<InputEvent> {
    let Some(buf) = ts.upload_prompt.as_mut() else {
        return vec![];
    };
    match code {
        KeyCode::Esc => {
            ts.upload_prompt = None;
            vec![]
        }
        KeyCode::Enter => {
            let path = ts.upload_prompt.take().unwrap_or_default();
            if path.trim().is_empty() {
                vec![]
            } else {
                vec![InputEvent::UploadSample(path)]
            }
        }
        KeyCode::Backspace => {
            buf.pop();
            vec![]
        }
        KeyCode::Char(c) => {
            buf.push(c);
            vec![]
        }
        _ => vec![],
    }
}

// '1' -> lane 0
fn drop_target(c: char) -> Option<u8> {
    let n = c.to_digit(10)? as usize;
    (1..=MAX_DROP_TARGETS).contains(&n).then(|| (n - 1) as u8)
}
