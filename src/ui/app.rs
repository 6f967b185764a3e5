//! Main TUI application state and logic

use crate::console::Session;
use crate::ui::input::LineEditor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Lines moved per PageUp/PageDown
const PAGE_LINES: usize = 10;

/// The main application state
pub struct App {
    /// The console session being driven
    pub session: Session,

    /// The line being typed
    pub editor: LineEditor,

    /// Transcript scroll offset; `usize::MAX` follows the newest line
    pub transcript_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        App {
            session,
            editor: LineEditor::new(),
            transcript_scroll: usize::MAX,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // A pulse triggered by the last event was drawn dark above and
            // lights up on the next frame
            self.session.stack_mut().pulse.advance(Instant::now());

            let hints = self.session.peripherals().take_refresh_requests();
            if hints > 0 {
                log::trace!("{} refresh hints from the module", hints);
            }

            // Poll with a timeout so the pulse can expire without input
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        // Left column: Transcript (top) | Input (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(columns[0]);

        // Right column: Stack (top) | Lamps (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(4)])
            .split(columns[1]);

        super::panes::render_transcript_pane(
            frame,
            left_rows[0],
            self.session.transcript(),
            false,
            &mut self.transcript_scroll,
        );

        super::panes::render_input_pane(
            frame,
            left_rows[1],
            &self.editor,
            self.session.is_loaded(),
        );

        super::panes::render_stack_pane(
            frame,
            right_rows[0],
            super::panes::StackRenderData {
                dump: self.session.stack().text(),
                pulse_lit: self.session.stack().pulse.is_lit(),
            },
        );

        super::panes::render_lamps_pane(frame, right_rows[1], &self.session.peripherals().lamps());

        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            super::panes::StatusRenderData {
                message: self.session.status(),
                state: self.session.state(),
                last_status: self.session.last_status(),
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => self.should_quit = true,
            KeyCode::Char('l') if ctrl => {
                self.session.clear_transcript();
                self.transcript_scroll = usize::MAX;
            }
            KeyCode::Char('r') if ctrl => {
                // Failures are reported in the status line
                let _ = self.session.reset();
            }
            KeyCode::Char('u') if ctrl => self.editor.clear(),
            KeyCode::Enter => self.submit(),
            KeyCode::Up => {
                if let Some(line) = self.session.recall_previous() {
                    self.editor.set(&line);
                }
            }
            KeyCode::Down => {
                if let Some(line) = self.session.recall_next() {
                    self.editor.set(&line);
                }
            }
            KeyCode::PageUp => {
                self.transcript_scroll = self.transcript_scroll.saturating_sub(PAGE_LINES);
            }
            KeyCode::PageDown => {
                self.transcript_scroll = self.transcript_scroll.saturating_add(PAGE_LINES);
            }
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => self.editor.home(),
            KeyCode::End => self.editor.end(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Char(c) if !ctrl => self.editor.insert(c),
            _ => {}
        }
    }

    /// Evaluate the typed line. It stays in the editor if it could not run.
    fn submit(&mut self) {
        let line = self.editor.text().to_string();
        match self.session.submit(&line) {
            Ok(_) => {
                self.editor.clear();
                self.transcript_scroll = usize::MAX;
            }
            Err(err) => log::debug!("line not submitted: {}", err),
        }
    }
}
