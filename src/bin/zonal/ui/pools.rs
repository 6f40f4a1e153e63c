//! Voice pool gauges

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

pub fn render_pools(frame: &mut Frame, area: Rect, init: &UiStateInit, state: &UiStateUpdate) {
    let block = Block::default()
        .title(format!(" Voices ({} release pending) ", state.scheduled_releases))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(
        pool_gauge("one-shot", state.one_shot_in_use, init.one_shot_capacity, Color::Cyan),
        rows[0],
    );
    frame.render_widget(
        pool_gauge("looping ", state.looping_in_use, init.looping_capacity, Color::Green),
        rows[1],
    );
}

fn pool_gauge(label: &str, in_use: usize, capacity: usize, color: Color) -> Gauge<'static> {
    let ratio = if capacity == 0 {
        0.0
    } else {
        (in_use as f64 / capacity as f64).clamp(0.0, 1.0)
    };
    // exhausted pool stands out
    let color = if capacity > 0 && in_use >= capacity { Color::Red } else { color };

    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(format!("{} {}/{}", label, in_use, capacity))
}
