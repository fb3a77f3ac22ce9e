use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::state::{Toast, ToastKind};
use crate::tui::theme;

/// Key hints, or the current toast while one is showing.
pub fn render(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], toast: Option<&Toast>) {
    let line = match toast {
        Some(toast) => {
            let (icon, style) = match toast.kind {
                ToastKind::Info => ("✓", theme::green()),
                ToastKind::Error => ("✗", theme::red()),
            };
            Line::from(vec![
                Span::styled(
                    format!("{} {}", icon, toast.title),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", toast.message), theme::dim()),
            ])
        }
        None => {
            let mut spans = Vec::new();
            for (key, label) in hints {
                spans.push(Span::styled(*key, theme::teal()));
                spans.push(Span::styled(format!(" {}  ", label), theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
