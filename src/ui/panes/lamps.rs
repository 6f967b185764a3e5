//! Lamp row rendering

use crate::console::LampPanel;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the lamps, lamp 0 on the right like bit 0 of a number
pub fn render_lamps_pane(frame: &mut Frame, area: Rect, panel: &LampPanel) {
    let block = Block::default()
        .title(" Lamps ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    let mut spans = Vec::new();
    for (i, &on) in panel.slots().iter().enumerate().rev() {
        let (symbol, style) = if on {
            (
                "●",
                Style::default()
                    .fg(DEFAULT_THEME.lamp_on)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("○", Style::default().fg(DEFAULT_THEME.lamp_off))
        };
        spans.push(Span::styled(symbol, style));
        if i > 0 {
            spans.push(Span::raw(" "));
        }
    }

    let labels: Vec<Span> = (0..panel.slots().len())
        .rev()
        .map(|i| {
            let label = if i > 0 { format!("{} ", i) } else { i.to_string() };
            Span::styled(label, Style::default().fg(DEFAULT_THEME.comment))
        })
        .collect();

    let paragraph = Paragraph::new(vec![Line::from(spans), Line::from(labels)])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
