//! TUI module for delayfx
//!
//! Shows the processed output and lets the user pick an effect and its mix.

mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use delayfx::EffectMessage;

use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Audio visualization buffer size (also the FFT size)
const VIS_BUFFER_SIZE: usize = 1024;

/// Mix change per Up/Down press.
const MIX_STEP: f64 = 0.05;

/// What the UI knows about each selectable effect.
#[derive(Debug, Clone, Copy)]
pub struct EffectInfo {
    pub name: &'static str,
    /// `None` for effects without a dry/wet control.
    pub mix: Option<f64>,
}

/// UI application state
pub struct UiApp {
    /// Processed samples from the audio thread
    audio_rx: Consumer<f32>,
    /// Parameter changes for the active effect
    msg_tx: Producer<EffectMessage>,
    /// Index of the effect to run
    select_tx: Producer<usize>,
    effects: Vec<EffectInfo>,
    active: usize,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        msg_tx: Producer<EffectMessage>,
        select_tx: Producer<usize>,
        effects: Vec<EffectInfo>,
        sample_rate: f32,
    ) -> Self {
        Self {
            audio_rx,
            msg_tx,
            select_tx,
            effects,
            active: 0,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Read everything available, keeping the last VIS_BUFFER_SIZE samples
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received && self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.active = (self.active + 1) % self.effects.len().max(1);
                if self.select_tx.push(self.active).is_err() {
                    log::warn!("control queue full, effect change dropped");
                }
            }
            KeyCode::Up => self.nudge_mix(MIX_STEP),
            KeyCode::Down => self.nudge_mix(-MIX_STEP),
            KeyCode::Char('c') | KeyCode::Char('C') => self.send(EffectMessage::Clear),
            _ => {}
        }
    }

    fn nudge_mix(&mut self, delta: f64) {
        let Some(info) = self.effects.get_mut(self.active) else {
            return;
        };
        let Some(mix) = info.mix else {
            return;
        };
        let mix = (mix + delta).clamp(0.0, 1.0);
        info.mix = Some(mix);
        self.send(EffectMessage::SetEffectMix(mix));
    }

    fn send(&mut self, msg: EffectMessage) {
        if self.msg_tx.push(msg).is_err() {
            log::warn!("control queue full, {msg:?} dropped");
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Effect selector
                Constraint::Min(8),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_selector(frame, chunks[0]);
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(" [Tab] Next effect  [Up/Down] Mix  [C] Clear  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }

    fn render_selector(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::with_capacity(self.effects.len() * 2);
        for (i, info) in self.effects.iter().enumerate() {
            let style = if i == self.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ", info.name), style));
            spans.push(Span::raw(" "));
        }

        let title = match self.effects.get(self.active).and_then(|info| info.mix) {
            Some(mix) => format!(" Effect  mix {:.0}% ", mix * 100.0),
            None => " Effect ".to_string(),
        };
        let selector =
            Paragraph::new(Line::from(spans)).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(selector, area);
    }
}
