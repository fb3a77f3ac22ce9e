use ratatui::style::{Color, Modifier, Style};

use crate::utils::format::hex_to_rgb;

pub const BG: Color = Color::Rgb(15, 18, 22);
pub const SURFACE: Color = Color::Rgb(24, 28, 34);
pub const BORDER: Color = Color::Rgb(52, 60, 70);
pub const TEXT: Color = Color::Rgb(226, 232, 240);
pub const TEXT_DIM: Color = Color::Rgb(120, 130, 145);
pub const TEAL: Color = Color::Rgb(6, 182, 212);
pub const GREEN: Color = Color::Rgb(34, 197, 94);
pub const AMBER: Color = Color::Rgb(245, 158, 11);
pub const RED: Color = Color::Rgb(244, 63, 94);
pub const EMPTY: Color = Color::Rgb(40, 46, 54);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn teal() -> Style {
    Style::default().fg(TEAL)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

/// An activity's own `#rrggbb` color, teal if it can't be parsed.
pub fn activity(color: &str) -> Color {
    hex_to_rgb(color)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(TEAL)
}
