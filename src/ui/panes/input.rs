//! Input line rendering

use crate::ui::input::LineEditor;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PROMPT: &str = "> ";

/// Render the input line and place the terminal cursor in it
pub fn render_input_pane(frame: &mut Frame, area: Rect, editor: &LineEditor, enabled: bool) {
    let border_style = if enabled {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Input ")
        .borders(Borders::ALL)
        .border_style(border_style);

    // Keep the cursor visible on long lines
    let inner_width = area.width.saturating_sub(2 + PROMPT.len() as u16).max(1) as usize;
    let skip = editor.cursor().saturating_sub(inner_width - 1);
    let visible: String = editor.text().chars().skip(skip).take(inner_width).collect();

    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(DEFAULT_THEME.primary)),
        Span::styled(visible, Style::default().fg(DEFAULT_THEME.fg)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if enabled {
        let x = area.x + 1 + PROMPT.len() as u16 + (editor.cursor() - skip) as u16;
        frame.set_cursor_position((x, area.y + 1));
    }
}
