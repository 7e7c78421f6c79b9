// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the scale trainer.
//!
//! Provides a ratatui-based terminal interface with a header, settings
//! panel, scale display, clickable piano keyboard and status bar.

mod keyboard;
mod panel;

pub use keyboard::{key_at, key_style, layout_keys, KeyRect, KeyboardWidget};
pub use panel::{ControlPanelWidget, ScaleWidget};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::debug;

use crate::control::{format_shortcut, ControlAction, KeyboardController};
use crate::midi::MidiStatus;
use crate::music::NoteToken;
use crate::practice::PracticeSession;

/// Redraws per second while idle
const FRAME_RATE: u64 = 60;

/// How long a status message stays up
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// UI-only state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }
}

/// Everything one frame draws
pub struct TrainerView<'a> {
    pub session: &'a PracticeSession,
    pub midi: &'a MidiStatus,
    pub ui: &'a UiState,
    pub controls: &'a KeyboardController,
}

/// Screen regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub panel: Rect,
    pub scale: Rect,
    pub keyboard: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Settings
                Constraint::Length(3), // Scale
                Constraint::Min(6),    // Keyboard
                Constraint::Length(1), // Status bar
            ])
            .split(area);
        Self {
            header: chunks[0],
            panel: chunks[1],
            scale: chunks[2],
            keyboard: chunks[3],
            status: chunks[4],
        }
    }

    /// Area inside the keyboard border, where keys are drawn
    pub fn keys(&self) -> Rect {
        keyboard_block().inner(self.keyboard)
    }
}

fn keyboard_block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title(" Keyboard ")
}

/// Turns mouse button events into note presses and releases
#[derive(Debug, Clone, Default)]
pub struct MouseKeys {
    held: Option<NoteToken>,
}

impl MouseKeys {
    /// `note` is the key under the pointer, if any
    pub fn handle(&mut self, kind: MouseEventKind, note: Option<NoteToken>) -> Vec<ControlAction> {
        let mut actions = Vec::new();
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(old) = self.held.take() {
                    actions.push(ControlAction::ReleaseNote(old));
                }
                if let Some(note) = note {
                    self.held = Some(note);
                    actions.push(ControlAction::PressNote(note));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Sliding off a key releases it
                if self.held.is_some() && self.held != note {
                    if let Some(old) = self.held.take() {
                        actions.push(ControlAction::ReleaseNote(old));
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(old) = self.held.take() {
                    actions.push(ControlAction::ReleaseNote(old));
                }
            }
            _ => {}
        }
        actions
    }
}

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Whether the terminal reports key releases
    key_release_events: bool,
    /// Area of the last drawn frame
    last_area: Rect,
    mouse: MouseKeys,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let key_release_events = supports_keyboard_enhancement().unwrap_or(false);
        if key_release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        debug!(key_release_events, "terminal ready");

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            key_release_events,
            last_area: Rect::default(),
            mouse: MouseKeys::default(),
        })
    }

    /// Whether key-up events will arrive
    pub fn key_release_events(&self) -> bool {
        self.key_release_events
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / FRAME_RATE);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Press and release keys under the mouse
    pub fn handle_mouse(&mut self, event: MouseEvent) -> Vec<ControlAction> {
        let keys = ScreenLayout::new(self.last_area).keys();
        let note = key_at(keys, event.column, event.row);
        self.mouse.handle(event.kind, note)
    }

    /// Draw the UI
    pub fn draw(&mut self, view: &TrainerView) -> io::Result<()> {
        let mut drawn = self.last_area;
        self.terminal.draw(|frame| {
            drawn = frame.area();
            render(frame, view);
        })?;
        self.last_area = drawn;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        if self.key_release_events {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render a full frame
pub fn render(frame: &mut Frame, view: &TrainerView) {
    let area = frame.area();
    let layout = ScreenLayout::new(area);
    let settings = view.session.settings();

    render_header(frame, layout.header, view);

    frame.render_widget(
        ControlPanelWidget::new(settings, view.midi)
            .block(Block::default().borders(Borders::ALL).title(" Settings ")),
        layout.panel,
    );

    let pitches = view.session.scale_pitch_classes();
    frame.render_widget(
        ScaleWidget::new(settings, &pitches)
            .block(Block::default().borders(Borders::ALL).title(" Scale ")),
        layout.scale,
    );

    frame.render_widget(
        KeyboardWidget::new(view.session).block(keyboard_block()),
        layout.keyboard,
    );

    render_status_bar(frame, layout.status, view.ui);

    if view.ui.show_help {
        render_help_overlay(frame, area, view.controls);
    }
}

/// Render title, completed count and MIDI status
fn render_header(frame: &mut Frame, area: Rect, view: &TrainerView) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16), // Title
            Constraint::Length(18), // Completed
            Constraint::Min(0),     // MIDI
        ])
        .split(inner);

    let title = Paragraph::new("Scale Trainer")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    let completed = view.session.completed();
    if completed > 0 {
        let text = Paragraph::new(format!("Completed: {}", completed))
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
        frame.render_widget(text, chunks[1]);
    }

    frame.render_widget(Paragraph::new(midi_status_line(view.midi)), chunks[2]);
}

/// One-line MIDI connection summary
pub fn midi_status_line(status: &MidiStatus) -> Line<'static> {
    let (text, color) = if !status.supported {
        ("MIDI: unavailable".to_string(), Color::DarkGray)
    } else if let (true, Some(name)) = (status.connected, status.device_name.as_ref()) {
        (format!("MIDI: connected ({})", name), Color::Green)
    } else {
        ("MIDI: not connected".to_string(), Color::Gray)
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " ←/→: Key | ↑/↓: Major/Minor | F1: Help | F2: Names | F3: Hints | F4: MIDI | F5: Reset | Esc: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Help lines built from the live bindings
pub fn help_lines(controls: &KeyboardController) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    let mut grouped: Vec<_> = controls.bindings_by_category().into_iter().collect();
    grouped.sort_by(|a, b| a.0.cmp(&b.0));

    for (category, mut bindings) in grouped {
        bindings.sort_by_key(|b| format_shortcut(&b.shortcut));
        lines.push(Line::from(Span::styled(category, heading)));
        for binding in bindings {
            lines.push(Line::from(format!(
                "  {:<10}  {}",
                format_shortcut(&binding.shortcut),
                binding.description
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled("Notes", heading)));
    let notes = controls.note_bindings();
    for row in notes.chunks(6) {
        let cells: Vec<String> = row
            .iter()
            .map(|(c, note)| format!("{}={:<4}", c, note.to_string()))
            .collect();
        lines.push(Line::from(format!("  {}", cells.join(" "))));
    }
    lines
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, controls: &KeyboardController) {
    let lines = help_lines(controls);

    let width = 52.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Paragraph::new(lines).block(block), help_area);
}
