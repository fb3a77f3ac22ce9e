use chrono::{NaiveDate, Utc};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::TrackedActivity;
use crate::streaks::{current_streak, recent_days};
use crate::tui::theme;
use crate::utils::format::{plural_days, time_ago};

/// Dashboard cards: name, streak badge, age and a recent-day strip.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    activities: &[TrackedActivity],
    selected: usize,
    today: NaiveDate,
    recent: usize,
) {
    let block = Block::default()
        .title(Span::styled(" Your Activities ", theme::teal()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let now = Utc::now();
    let items: Vec<ListItem> = activities
        .iter()
        .enumerate()
        .map(|(i, tracked)| {
            let color = theme::activity(&tracked.activity.color);
            let is_selected = i == selected;
            let streak = current_streak(&tracked.completions, today);

            let name_style = if is_selected {
                theme::bold().add_modifier(Modifier::UNDERLINED)
            } else {
                theme::bold()
            };
            let marker = if is_selected { "▸ " } else { "  " };

            let title = Line::from(vec![
                Span::styled(marker, theme::teal()),
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(tracked.activity.name.clone(), name_style),
                Span::styled(
                    format!("   {} streak", plural_days(streak)),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]);

            let created = Line::from(Span::styled(
                format!("    Created {}", time_ago(tracked.activity.created_at, now)),
                theme::dim(),
            ));

            let days = recent_days(&tracked.completions, today, recent);
            let mut dots = vec![Span::raw("    ")];
            let mut initials = vec![Span::raw("    ")];
            for cell in &days {
                let (glyph, style) = if cell.completed {
                    ("●", Style::default().fg(color))
                } else {
                    ("○", theme::dim())
                };
                dots.push(Span::styled(format!("{} ", glyph), style));
                let initial: String = cell.date.format("%a").to_string().chars().take(1).collect();
                initials.push(Span::styled(format!("{} ", initial), theme::dim()));
            }

            ListItem::new(vec![
                title,
                created,
                Line::from(dots),
                Line::from(initials),
                Line::from(""),
            ])
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    let list = List::new(items).block(block);
    frame.render_stateful_widget(list, area, &mut list_state);
}
