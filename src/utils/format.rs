use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{CalendarCell, DateRange};

/// Validate a `#rrggbb` color and return it lowercased.
pub fn normalize_color(color: &str) -> Result<String> {
    let color = color.trim();
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color '{}'. Use #rrggbb, e.g. #06b6d4", color);
    }
    Ok(format!("#{}", hex.to_ascii_lowercase()))
}

/// Split a `#rrggbb` color into its channels.
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// "● ● ○ ●" style strip, one glyph per day.
pub fn day_strip(cells: &[CalendarCell]) -> String {
    cells
        .iter()
        .map(|c| if c.completed { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn plural_days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// "May 5 - May 11, 2025"
pub fn week_title(range: &DateRange) -> String {
    format!(
        "{} - {}",
        range.start.format("%b %-d"),
        range.end.format("%b %-d, %Y")
    )
}

pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Coarse "3 days ago" style distance from `then` to `now`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days();
    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=44 => format!("{} days ago", days),
        45..=364 => {
            let months = ((days as f64) / 30.0).round() as i64;
            if months <= 1 {
                "about 1 month ago".to_string()
            } else {
                format!("{} months ago", months)
            }
        }
        _ => {
            let years = days / 365;
            if years == 1 {
                "about 1 year ago".to_string()
            } else {
                format!("{} years ago", years)
            }
        }
    }
}
