//! Transcript pane rendering

use crate::snapshot::{LineKind, Transcript};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the transcript pane.
///
/// Long lines wrap at the pane edge. `scroll_offset` counts wrapped rows and
/// is clamped in place; `usize::MAX` sticks to the bottom.
pub fn render_transcript_pane(
    frame: &mut Frame,
    area: Rect,
    transcript: &Transcript,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if transcript.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let inner_width = area.width.saturating_sub(3).max(1) as usize;
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let rows: Vec<ListItem> = transcript
        .lines
        .iter()
        .flat_map(|line| {
            let style = match line.kind {
                LineKind::Input => Style::default().fg(DEFAULT_THEME.input),
                LineKind::Output => Style::default().fg(DEFAULT_THEME.fg),
                LineKind::Notice => Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            };
            wrap_chars(&line.text, inner_width)
                .into_iter()
                .map(move |row| ListItem::new(row).style(style))
        })
        .collect();

    let total_rows = rows.len();
    if total_rows > visible_height {
        let max_scroll = total_rows - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = rows
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

/// Split `text` into rows of at most `width` characters; empty text is one row
fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
