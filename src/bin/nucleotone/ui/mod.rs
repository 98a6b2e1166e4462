//! TUI shell: frame loop, layout, and input.
//!
//! The loop runs at display cadence (~60 Hz poll) and is fully decoupled
//! from the audio clock: each renderer keeps private animation state and
//! samples the engine's broadcast cells once per frame, never waiting on
//! the scheduler.

mod interference;
mod lattice;
mod strand;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};

use nucleotone::Sequence;

use crate::app::App;
use interference::InterferenceView;
use lattice::LatticeView;
use strand::StrandView;

/// Audio samples kept for the waveform view.
const VIS_BUFFER_SIZE: usize = 1024;

pub fn run(app: &mut App) -> EyreResult<()> {
    let mut terminal = ratatui::init();
    let result = UiApp::new().run(app, &mut terminal);
    ratatui::restore();
    result
}

struct UiApp {
    strand: StrandView,
    interference: InterferenceView,
    lattice: LatticeView,
    audio_buffer: Vec<f32>,
    last_frame: Instant,
    should_quit: bool,
}

impl UiApp {
    fn new() -> Self {
        Self {
            strand: StrandView::new(),
            interference: InterferenceView::new(),
            lattice: LatticeView::new(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            last_frame: Instant::now(),
            should_quit: false,
        }
    }

    fn run(&mut self, app: &mut App, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            let dt = now.duration_since(self.last_frame).as_secs_f64().min(0.1);
            self.last_frame = now;

            app.poll_evolve(now);
            self.poll_audio(app);

            // One non-blocking read of the broadcast state per frame; all
            // three renderers see the same snapshot.
            let position = app.position();
            let frequencies = app.frequencies();
            let sequence = app.active_sequence();

            self.strand
                .update(position, sequence.bases(), &frequencies, dt);
            self.interference.update(position, &frequencies, dt);
            self.lattice.update(dt);

            terminal.draw(|frame| {
                self.render(frame, app, position, &frequencies, &sequence)
            })?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(app, key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Drain the audio tap, keeping the most recent samples.
    fn poll_audio(&mut self, app: &mut App) {
        let Some(rig) = &mut app.audio else { return };

        let mut new_samples = Vec::new();
        while let Ok(sample) = rig.tap.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    fn handle_key(&mut self, app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => app.toggle_play(),
            KeyCode::Char('k') | KeyCode::Char('K') => app.cycle_key(),
            KeyCode::Char('m') | KeyCode::Char('M') => app.randomize_mutation(),
            KeyCode::Char('e') | KeyCode::Char('E') => app.toggle_evolve(),
            KeyCode::Char('b') | KeyCode::Char('B') => app.toggle_biofeedback(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_speed(0.1),
            KeyCode::Char('-') => app.adjust_speed(-0.1),
            _ => {}
        }
    }

    fn render(
        &self,
        frame: &mut Frame,
        app: &App,
        position: i32,
        frequencies: &[f32],
        sequence: &Sequence,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Transport
                Constraint::Min(8),    // Renderers
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        transport::render_transport(frame, chunks[0], app, position, frequencies, sequence);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(chunks[1]);

        self.strand.render(frame, panes[0], &self.audio_buffer);
        self.interference
            .render(frame, panes[1], position, frequencies);
        self.lattice.render(frame, panes[2], position, frequencies);

        let help = Paragraph::new(
            " [Space] Play/Stop  [K]ey  [M]utate  [E]volve  [B]iofeedback  [+/-] Speed  [Q]uit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
