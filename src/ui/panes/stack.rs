//! Data stack pane rendering
//!
//! Shows the module's hex dump as text, followed by the same cells decoded to
//! signed decimal. The border lights up while the update pulse is on.

use crate::snapshot::StackSnapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

/// Data needed to render the stack pane
pub struct StackRenderData<'a> {
    /// Dump text exactly as the module wrote it
    pub dump: &'a str,
    pub pulse_lit: bool,
}

/// Render the stack pane
pub fn render_stack_pane(frame: &mut Frame, area: Rect, data: StackRenderData) {
    let (border_style, bg) = if data.pulse_lit {
        (
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
            DEFAULT_THEME.pulse_bg,
        )
    } else {
        (
            Style::default().fg(DEFAULT_THEME.border_normal),
            ratatui::style::Color::Reset,
        )
    };

    let block = Block::default()
        .title(" Data Stack ")
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let mut lines: Vec<Line> = data
        .dump
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let color = if i == 0 {
                DEFAULT_THEME.primary
            } else {
                DEFAULT_THEME.number
            };
            Line::from(Span::styled(text.to_string(), Style::default().fg(color)))
        })
        .collect();

    if let Some(snapshot) = StackSnapshot::parse(data.dump) {
        if !snapshot.cells.is_empty() {
            lines.push(Line::default());
            let decimal = snapshot
                .cells
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(Line::from(Span::styled(
                decimal,
                Style::default().fg(DEFAULT_THEME.comment),
            )));
        }
        if snapshot.is_truncated() {
            lines.push(Line::from(Span::styled(
                format!("({} more)", snapshot.depth - snapshot.cells.len()),
                Style::default().fg(DEFAULT_THEME.comment),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
