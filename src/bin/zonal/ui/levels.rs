//! Proxy level meters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

pub fn render_levels(frame: &mut Frame, area: Rect, init: &UiStateInit, state: &UiStateUpdate) {
    let count = (state.num_proxies as usize).min(init.proxy_names.len());
    let bars: Vec<Bar> = init
        .proxy_names
        .iter()
        .zip(state.proxy_levels.iter())
        .take(count)
        .map(|(name, &level)| {
            let percent = (level.clamp(0.0, 1.0) * 100.0).round() as u64;
            Bar::default()
                .label(name.clone().into())
                .value(percent)
                .text_value(format!("{}%", percent))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().title(" Proxy levels ").borders(Borders::ALL))
        .direction(ratatui::layout::Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green))
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}
