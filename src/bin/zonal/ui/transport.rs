//! Transport bar widget - sim time, run state, avatar and master volume

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiStateUpdate;

pub fn render_transport(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    let block = Block::default().title(" zonal ").borders(Borders::ALL);

    let (symbol, run_state) = if state.paused { ("⏸", "Paused") } else { ("▶", "Running") };
    let heading = match state.walking {
        d if d < 0 => "←",
        d if d > 0 => "→",
        _ => "·",
    };
    let stance = if state.grounded { "grounded" } else { "airborne" };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", symbol, run_state),
            Style::default().fg(if state.paused { Color::Yellow } else { Color::Green }),
        ),
        Span::styled(format!("t {:>7.2}s  ", state.time), Style::default().fg(Color::White)),
        Span::styled(
            format!("x {:>6.1} {} {}  ", state.avatar_x, heading, stance),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Master {:.0}%  ", state.master_volume * 100.0),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("Steps {}", state.footsteps_played),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
