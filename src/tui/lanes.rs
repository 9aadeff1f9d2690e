use crate::shared::{DisplayState, TrackRow};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

const LANE_HEIGHT: u16 = 3;

// one bordered row per track: label + volume in the title, the clips inside
pub fn draw_track_lanes(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let outer = Block::bordered().title(" Tracks ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    if state.tracks.is_empty() {
        frame.render_widget(Paragraph::new("no tracks, press n to add one"), inner);
        return;
    }

    let constraints: Vec<Constraint> = state
        .tracks
        .iter()
        .map(|_| Constraint::Length(LANE_HEIGHT))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (pos, (track, row)) in state.tracks.iter().zip(rows.iter()).enumerate() {
        let selected = state.selected_track == Some(pos);
        let entry_cursor = if selected { state.selected_entry } else { None };
        draw_lane(frame, *row, pos, track, selected, entry_cursor);
    }
}

fn draw_lane(
    frame: &mut Frame,
    area: Rect,
    pos: usize,
    track: &TrackRow,
    selected: bool,
    entry_cursor: Option<usize>,
) {
    let border = if selected {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = format!(" [{}] {}  vol {:>3.0}% ", pos + 1, track.label, track.volume * 100.0);
    let block = Block::bordered().title(title).border_style(border);

    let line = if track.entries.is_empty() {
        Line::from(Span::styled("(empty)", Style::default().fg(Color::DarkGray)))
    } else {
        let mut spans = Vec::with_capacity(track.entries.len() * 2);
        for (i, name) in track.entries.iter().enumerate() {
            let mut style = Style::default();
            if track.now_playing == Some(i) {
                style = style.fg(Color::Black).bg(Color::LightGreen);
            }
            if entry_cursor == Some(i) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            spans.push(Span::styled(format!(" {name} "), style));
            spans.push(Span::raw("→"));
        }
        spans.pop();
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}
