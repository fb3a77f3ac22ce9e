use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

/// App title on the first line, `subtitle` beneath it.
pub fn render(frame: &mut Frame, area: Rect, subtitle: Line) {
    let title_line = Line::from(vec![
        Span::styled("TimeTrail", theme::teal().add_modifier(Modifier::BOLD)),
    ]);

    let text = vec![title_line, subtitle];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::teal())
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
