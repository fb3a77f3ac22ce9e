use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::ActivityStats;
use crate::tui::theme;
use crate::utils::format::plural_days;

pub fn render(frame: &mut Frame, area: Rect, stats: &ActivityStats, color: Color) {
    let cards = [
        ("Current Streak", plural_days(stats.current_streak), true),
        ("Best Streak", plural_days(stats.best_streak), false),
        ("This Month", plural_days(stats.this_month), false),
        ("Total Completions", stats.total.to_string(), false),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((title, value, highlight), column) in cards.into_iter().zip(columns.iter()) {
        let value_style = if highlight {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };
        let block = Block::default()
            .title(Span::styled(format!(" {} ", title), theme::dim()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::surface());
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(value, value_style))])
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, *column);
    }
}
