//! Terminal UI for zonal
//!
//! Shows the avatar on the zone strip, per-zone debounce and fade state,
//! voice pool usage and proxy levels.

mod levels;
mod pools;
pub mod state;
mod strip;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;
use zonal_audio::playback::EngineMessage;

use state::{ControlMessage, UiStateInit, UiStateUpdate};

use levels::render_levels;
use pools::render_pools;
use strip::render_strip;
use transport::render_transport;

const VOLUME_STEP: f32 = 0.1;

pub struct UiApp {
    init: UiStateInit,
    state_rx: Consumer<UiStateUpdate>,
    control_tx: Producer<ControlMessage>,
    engine_tx: Producer<EngineMessage>,
    /// Latest state received from the sim thread
    current: UiStateUpdate,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        init: UiStateInit,
        state_rx: Consumer<UiStateUpdate>,
        control_tx: Producer<ControlMessage>,
        engine_tx: Producer<EngineMessage>,
    ) -> Self {
        Self {
            init,
            state_rx,
            control_tx,
            engine_tx,
            current: UiStateUpdate::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        let _ = self.control_tx.push(ControlMessage::Quit);
        Ok(())
    }

    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current = state;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let control = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Left => ControlMessage::Walk(-1),
            KeyCode::Right => ControlMessage::Walk(1),
            KeyCode::Down => ControlMessage::Walk(0),
            KeyCode::Char('j') => ControlMessage::ToggleGrounded,
            KeyCode::Char(' ') => ControlMessage::TogglePause,
            KeyCode::Char('r') => ControlMessage::Reset,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.nudge_master(VOLUME_STEP);
                return;
            }
            KeyCode::Char('-') => {
                self.nudge_master(-VOLUME_STEP);
                return;
            }
            _ => return,
        };
        // full buffer means the sim thread is gone or stalled
        let _ = self.control_tx.push(control);
    }

    fn nudge_master(&mut self, delta: f32) {
        let volume = (self.current.master_volume + delta).clamp(0.0, 1.0);
        let _ = self.engine_tx.push(EngineMessage::SetMasterVolume(volume));
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(8),    // Zone strip
                Constraint::Length(4), // Voice pools
                Constraint::Length(6), // Proxy levels
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(frame, chunks[0], &self.current);
        render_strip(frame, chunks[1], &self.init, &self.current);
        render_pools(frame, chunks[2], &self.init, &self.current);
        render_levels(frame, chunks[3], &self.init, &self.current);

        let help = Paragraph::new(
            " [Q] Quit  [←/→] Walk  [↓] Stop  [J] Jump  [Space] Pause  [R] Reset  [+/-] Master",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
