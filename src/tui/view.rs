use crate::shared::DisplayState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::lanes::draw_track_lanes;
use super::mode::TuiState;

const VOLUME_BAR_WIDTH: usize = 10;

const HELP: &str = "space play/stop  ↑↓ sample  c category  enter add  1-9 drop  [ ] sample vol  \
                    ←→ track  , . entry  ⌫ remove  n/D add/del track  - = track vol  \
                    u upload  r rec  s save  q quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, ts: &TuiState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport + status
            Constraint::Min(8),    // palette + lanes
            Constraint::Length(3), // key help
        ])
        .split(area);

    draw_header(frame, sections[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(sections[1]);
    draw_palette(frame, body[0], state);
    draw_track_lanes(frame, body[1], state);

    frame.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)).block(Block::bordered()),
        sections[2],
    );

    if let Some(path) = &ts.upload_prompt {
        draw_upload_prompt(frame, area, path);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let transport = if state.playing {
        Span::styled(" ▶ PLAYING ", Style::default().fg(Color::Black).bg(Color::LightGreen))
    } else {
        Span::styled(" ■ STOPPED ", Style::default().fg(Color::Black).bg(Color::Gray))
    };
    let rec = if state.recording {
        Span::styled(
            format!(" ● REC {:.1}s ", state.recorded_secs),
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if state.recorded_secs > 0.0 {
        Span::raw(format!(" rec {:.1}s ", state.recorded_secs))
    } else {
        Span::raw("")
    };
    let line = Line::from(vec![transport, Span::raw(" "), rec, Span::raw("  "), Span::raw(state.status.as_str())]);
    frame.render_widget(Paragraph::new(line).block(Block::bordered().title(" looptty ")), area);
}

fn draw_palette(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let title = match &state.category {
        Some(c) => format!(" Samples: {c} "),
        None => " Samples ".to_string(),
    };
    let items: Vec<ListItem> = state
        .samples
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<22}", s.label())),
                Span::styled(volume_bar(s.volume), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::bordered().title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(state.selected_sample);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_upload_prompt(frame: &mut Frame, area: Rect, path: &str) {
    let width = area.width.saturating_sub(8).min(70);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height / 2 - area.height.min(3) / 2,
        width,
        height: area.height.min(3),
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(format!("{path}▏"))
            .block(Block::bordered().title(" Upload sample: path, enter to load, esc to cancel ")),
        popup,
    );
}

// "▮▮▮▮▮▯▯▯▯▯" for 0.5
fn volume_bar(volume: f32) -> String {
    let filled = (volume.clamp(0.0, 1.0) * VOLUME_BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "▮".repeat(filled), "▯".repeat(VOLUME_BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_bar_rounds_to_cells() {
        assert_eq!(volume_bar(0.5), "▮▮▮▮▮▯▯▯▯▯");
        assert_eq!(volume_bar(0.0), "▯".repeat(10));
        assert_eq!(volume_bar(1.0), "▮".repeat(10));
    }
}
