//! Zone strip widget - one row per zone with its extent and the avatar marker

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zonal_audio::zones::{FadeState, Transition};

use super::{
    state::{ZoneDynamicState, ZoneStaticInfo},
    UiStateInit, UiStateUpdate,
};

const LABEL_WIDTH: u16 = 8;
const STATUS_WIDTH: u16 = 22;

pub fn render_strip(frame: &mut Frame, area: Rect, init: &UiStateInit, state: &UiStateUpdate) {
    let block = Block::default().title(" Zones ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let track_width = inner.width.saturating_sub(LABEL_WIDTH + STATUS_WIDTH + 2) as usize;
    if inner.height < 2 || track_width < 10 {
        return;
    }

    let span = (init.map_max_x - init.map_min_x).max(f32::EPSILON);
    let column = |x: f32| -> usize {
        let t = ((x - init.map_min_x) / span).clamp(0.0, 1.0);
        ((t * (track_width - 1) as f32).round() as usize).min(track_width - 1)
    };
    let avatar_col = column(state.avatar_x);

    let mut lines = Vec::with_capacity(init.zones.len() + 1);

    // avatar row
    let mut marker = " ".repeat(LABEL_WIDTH as usize);
    marker.push_str(&" ".repeat(avatar_col));
    marker.push('▼');
    lines.push(Line::from(Span::styled(
        marker,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));

    let count = (state.num_zones as usize).min(init.zones.len());
    for (info, zone) in init.zones.iter().zip(state.zones.iter()).take(count) {
        lines.push(zone_row(info, zone, column(info.min_x), column(info.max_x), avatar_col, track_width));
    }

    if state.group_inside {
        lines.push(Line::from(Span::styled(
            format!("{:w$}chapel group occupied", "", w = LABEL_WIDTH as usize),
            Style::default().fg(Color::Magenta),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn zone_row(
    info: &ZoneStaticInfo,
    zone: &ZoneDynamicState,
    start: usize,
    end: usize,
    avatar_col: usize,
    width: usize,
) -> Line<'static> {
    let color = match (zone.inside, zone.touching) {
        (true, _) => Color::Green,
        (false, true) => Color::Yellow,
        (false, false) => Color::DarkGray,
    };

    let mut spans = vec![Span::styled(
        format!("{:<6.6}  ", info.name),
        Style::default().fg(Color::White),
    )];

    let mut track = String::with_capacity(width);
    for col in 0..width {
        track.push(match col {
            c if c == avatar_col && (start..=end).contains(&c) => '┃',
            c if c == avatar_col => '│',
            c if (start..=end).contains(&c) => '█',
            _ => '─',
        });
    }
    spans.push(Span::styled(track, Style::default().fg(color)));
    spans.push(Span::styled(format!("  {}", status(zone)), Style::default().fg(color)));

    Line::from(spans)
}

fn status(zone: &ZoneDynamicState) -> String {
    let fade = match zone.fade {
        Some(FadeState::Idle) => "idle",
        Some(FadeState::FadingIn) => "fading in",
        Some(FadeState::Steady) => "steady",
        Some(FadeState::FadingOut) => "fading out",
        None => "-",
    };
    let queued = match zone.queued {
        Some(Transition::Enter) => " +enter",
        Some(Transition::Exit) => " +exit",
        None => "",
    };
    format!("{}{}", fade, queued)
}
