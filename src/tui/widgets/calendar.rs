use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::models::{CalendarCell, MonthSummary, TrackedActivity, ViewGranularity};
use crate::streaks::calendar::WEEKDAY_LABELS;
use crate::streaks::{build_view, date_range, CalendarView};
use crate::tui::theme;
use crate::utils::format::{month_title, week_title};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    tracked: &TrackedActivity,
    view: ViewGranularity,
    reference: NaiveDate,
    today: NaiveDate,
) {
    let color = theme::activity(&tracked.activity.color);
    let range = date_range(view, reference);
    let title = match view {
        ViewGranularity::Week => format!(" Week of {} ", week_title(&range)),
        ViewGranularity::Month => format!(" {} ", month_title(range.start)),
        ViewGranularity::Year => format!(" {} ", range.start.format("%Y")),
    };

    let block = Block::default()
        .title(Span::styled(title, theme::teal().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match build_view(&tracked.completions, view, reference) {
        CalendarView::Week(cells) => render_week(frame, inner, &cells, color, today),
        CalendarView::Month(grid) => render_month(frame, inner, &grid, color, today),
        CalendarView::Year(months) => render_year(frame, inner, &months, color),
    }
}

fn day_style(cell: &CalendarCell, color: Color, today: NaiveDate) -> Style {
    let style = if cell.completed {
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else if cell.in_period {
        Style::default().fg(theme::TEXT).bg(theme::EMPTY)
    } else {
        theme::dim()
    };
    if cell.date == today {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

fn label_line() -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for label in WEEKDAY_LABELS {
        spans.push(Span::styled(format!(" {}  ", label), theme::dim()));
    }
    Line::from(spans)
}

fn render_week(
    frame: &mut Frame,
    area: Rect,
    cells: &[CalendarCell; 7],
    color: Color,
    today: NaiveDate,
) {
    let mut dots = vec![Span::raw("  ")];
    let mut numbers = vec![Span::raw("  ")];
    for cell in cells {
        let glyph = if cell.completed { " ✓ " } else { "   " };
        dots.push(Span::styled(glyph, day_style(cell, color, today)));
        dots.push(Span::raw("  "));
        numbers.push(Span::styled(format!(" {:>2}  ", cell.day), theme::dim()));
    }

    let text = vec![
        Line::from(""),
        label_line(),
        Line::from(""),
        Line::from(dots),
        Line::from(numbers),
    ];
    frame.render_widget(Paragraph::new(text), area);
}

fn render_month(
    frame: &mut Frame,
    area: Rect,
    grid: &[[CalendarCell; 7]],
    color: Color,
    today: NaiveDate,
) {
    let mut text = vec![Line::from(""), label_line()];
    for row in grid {
        let mut spans = vec![Span::raw("  ")];
        for cell in row {
            spans.push(Span::styled(
                format!(" {:>2} ", cell.day),
                day_style(cell, color, today),
            ));
            spans.push(Span::raw(" "));
        }
        text.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(text), area);
}

fn render_year(frame: &mut Frame, area: Rect, months: &[MonthSummary], color: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 3])
        .split(area);

    for (row_idx, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(*row_area);

        for (col_idx, cell_area) in cols.iter().enumerate() {
            let Some(summary) = months.get(row_idx * 4 + col_idx) else {
                continue;
            };
            let name = NaiveDate::from_ymd_opt(summary.year, summary.month, 1)
                .map(|d| d.format("%b").to_string())
                .unwrap_or_default();
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .title(Span::styled(format!(" {} ", name), theme::bold()))
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(theme::border()),
                )
                .gauge_style(Style::default().fg(color).bg(theme::EMPTY))
                .percent(summary.completion_percentage.min(100) as u16)
                .label(format!("{}%", summary.completion_percentage));
            frame.render_widget(gauge, *cell_area);
        }
    }
}
