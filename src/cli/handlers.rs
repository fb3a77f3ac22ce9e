use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::config::AppConfig;
use crate::db::repository::{ActivityRepo, ActivityUpdate, CompletionRepo};
use crate::models::{
    Activity, CalendarCell, CompletionMap, MonthSummary, TrackedActivity, ViewGranularity,
};
use crate::streaks::calendar::WEEKDAY_LABELS;
use crate::streaks::{activity_stats, build_view, current_streak, date_range, recent_days, CalendarView};
use crate::utils::format::{day_strip, hex_to_rgb, month_title, plural_days, progress_bar, week_title};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;6;182;212m";

/// Truecolor escape for an activity's own color, falling back to teal.
fn activity_color(color: &str) -> String {
    match hex_to_rgb(color) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        None => TEAL.to_string(),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an optional `--date` flag, defaulting to today.
pub fn parse_date_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        None => Ok(today()),
        Some(s) => Ok(CompletionMap::parse_key(s.trim())?),
    }
}

pub fn resolve_activity(conn: &Connection, selector: &str) -> Result<Activity> {
    ActivityRepo::find(conn, selector)?.ok_or_else(|| {
        anyhow!(
            "Activity '{}' not found. Run `timetrail list` to see your activities",
            selector
        )
    })
}

fn load_tracked_one(conn: &Connection, selector: &str) -> Result<TrackedActivity> {
    let activity = resolve_activity(conn, selector)?;
    let completions = CompletionRepo::completion_map(conn, activity.id)?;
    Ok(TrackedActivity::new(activity, completions))
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

// ─── Activities ──────────────────────────────────────────────────────────────

pub fn handle_add(
    conn: &Connection,
    config: &AppConfig,
    name: &str,
    color: Option<&str>,
    icon: Option<&str>,
) -> Result<Activity> {
    let color = color.unwrap_or(&config.activities.default_color);
    let activity = ActivityRepo::create(conn, name, color, icon, Utc::now())?;
    log::info!("Created activity {} ({})", activity.id, activity.name);
    println_colored!(GREEN, "  ✓ Created {} (id {})", activity.name, activity.id);
    Ok(activity)
}

pub fn handle_list(conn: &Connection, config: &AppConfig) -> Result<()> {
    let activities = crate::db::repository::load_tracked(conn)?;
    println!();
    if activities.is_empty() {
        println_colored!(DIM, "  No activities yet. Add one with `timetrail add <name>`");
        println!();
        return Ok(());
    }

    let today = today();
    println_colored!(TEAL, "  Your Activities");
    println!();
    for line in list_lines(&activities, today, config.display.recent_days) {
        println!("{}", line);
    }
    println!();
    Ok(())
}

/// One row per activity: id, name, streak badge, recent-day strip.
pub fn list_lines(activities: &[TrackedActivity], today: NaiveDate, recent: usize) -> Vec<String> {
    let width = activities
        .iter()
        .map(|t| unicode_width::UnicodeWidthStr::width(t.activity.name.as_str()))
        .max()
        .unwrap_or(0);

    activities
        .iter()
        .map(|t| {
            let streak = current_streak(&t.completions, today);
            let name_width = unicode_width::UnicodeWidthStr::width(t.activity.name.as_str());
            format!(
                "  {:>3}  {}{}{}  {}{:<12}\x1b[0m  {}",
                t.activity.id,
                activity_color(&t.activity.color),
                t.activity.name,
                " ".repeat(width.saturating_sub(name_width)),
                BOLD,
                format!("{} streak", plural_days(streak)),
                day_strip(&recent_days(&t.completions, today, recent)),
            )
        })
        .collect()
}

pub fn handle_rename(conn: &Connection, selector: &str, new_name: &str) -> Result<Activity> {
    let activity = resolve_activity(conn, selector)?;
    let update = ActivityUpdate {
        name: Some(new_name.to_string()),
        ..Default::default()
    };
    let updated = ActivityRepo::update(conn, activity.id, &update)?;
    log::info!("Renamed activity {} to {}", updated.id, updated.name);
    println_colored!(GREEN, "  ✓ Renamed {} → {}", activity.name, updated.name);
    Ok(updated)
}

pub fn handle_recolor(conn: &Connection, selector: &str, color: &str) -> Result<Activity> {
    let activity = resolve_activity(conn, selector)?;
    let update = ActivityUpdate {
        color: Some(color.to_string()),
        ..Default::default()
    };
    let updated = ActivityRepo::update(conn, activity.id, &update)?;
    println_colored!(
        activity_color(&updated.color),
        "  ● {} is now {}",
        updated.name,
        updated.color
    );
    Ok(updated)
}

pub fn handle_delete(conn: &Connection, selector: &str, yes: bool) -> Result<bool> {
    let activity = resolve_activity(conn, selector)?;
    if !yes {
        let answer = prompt(&format!(
            "  Delete '{}' and its whole history? This cannot be undone. [y/N] ",
            activity.name
        ))?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println_colored!(DIM, "  Cancelled");
            return Ok(false);
        }
    }
    let removed = ActivityRepo::delete(conn, activity.id)?;
    log::info!("Deleted activity {} ({})", activity.id, activity.name);
    println_colored!(RED, "  ✗ Deleted {}", activity.name);
    Ok(removed)
}

// ─── Completion ──────────────────────────────────────────────────────────────

/// Set (`Some`) or flip (`None`) completion for a day, then report the streak.
pub fn handle_mark(
    conn: &Connection,
    selector: &str,
    date: Option<&str>,
    completed: Option<bool>,
) -> Result<bool> {
    let activity = resolve_activity(conn, selector)?;
    let date = parse_date_arg(date)?;

    let record = match completed {
        Some(value) => CompletionRepo::set_completion(conn, activity.id, date, value)?,
        None => CompletionRepo::toggle(conn, activity.id, date)?,
    };
    log::info!("{} on {} -> {}", activity.name, date, record.completed);

    let completions = CompletionRepo::completion_map(conn, activity.id)?;
    let streak = current_streak(&completions, today());
    if record.completed {
        println_colored!(GREEN, "  ✓ {} completed for {}", activity.name, date);
    } else {
        println_colored!(DIM, "  ○ {} marked as not done for {}", activity.name, date);
    }
    println_colored!(AMBER, "  Current streak: {}", plural_days(streak));
    Ok(record.completed)
}

/// Forget whatever was recorded for a day.
pub fn handle_clear(conn: &Connection, selector: &str, date: Option<&str>) -> Result<bool> {
    let activity = resolve_activity(conn, selector)?;
    let date = parse_date_arg(date)?;
    let removed = CompletionRepo::clear(conn, activity.id, date)?;
    if removed {
        log::info!("Cleared {} on {}", activity.name, date);
        println_colored!(DIM, "  Cleared {} for {}", activity.name, date);
    } else {
        println_colored!(DIM, "  Nothing recorded for {} on {}", activity.name, date);
    }
    Ok(removed)
}

// ─── Calendar ────────────────────────────────────────────────────────────────

pub fn handle_show(
    conn: &Connection,
    config: &AppConfig,
    selector: &str,
    view: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let tracked = load_tracked_one(conn, selector)?;
    let granularity = match view {
        Some(v) => ViewGranularity::from_str(v)?,
        None => config.display.default_view,
    };
    let reference = parse_date_arg(date)?;

    println!();
    println_colored!(
        activity_color(&tracked.activity.color),
        "  {}",
        tracked.activity.name
    );
    for line in calendar_lines(&tracked.completions, granularity, reference) {
        println!("{}", line);
    }
    println!();
    Ok(())
}

/// Plain-text rendering of one calendar granularity.
pub fn calendar_lines(
    completions: &CompletionMap,
    granularity: ViewGranularity,
    reference: NaiveDate,
) -> Vec<String> {
    let range = date_range(granularity, reference);
    let mut lines = Vec::new();
    match build_view(completions, granularity, reference) {
        CalendarView::Week(cells) => {
            lines.push(format!("  Week of {}", week_title(&range)));
            lines.push(String::new());
            lines.push(format!("  {}", WEEKDAY_LABELS.map(|l| format!("{:<4}", l)).concat()));
            lines.push(format!("  {}", cells.map(|c| format!("{:<4}", mark(&c))).concat()));
            lines.push(format!("  {}", cells.map(|c| format!("{:<4}", c.day)).concat()));
        }
        CalendarView::Month(grid) => {
            lines.push(format!("  {}", month_title(range.start)));
            lines.push(String::new());
            lines.push(format!("  {}", WEEKDAY_LABELS.map(|l| format!(" {} ", l)).concat()));
            for row in grid.iter() {
                lines.push(format!("  {}", row.iter().map(month_cell).collect::<String>()));
            }
            lines.push(String::new());
            lines.push("  [dd] = completed   · = other month".to_string());
        }
        CalendarView::Year(months) => {
            lines.push(format!("  {}", range.start.format("%Y")));
            lines.push(String::new());
            for summary in &months {
                lines.push(year_line(summary));
            }
        }
    }
    lines
}

fn mark(cell: &CalendarCell) -> &'static str {
    if cell.completed { "●" } else { "○" }
}

fn month_cell(cell: &CalendarCell) -> String {
    if !cell.in_period {
        "  · ".to_string()
    } else if cell.completed {
        format!("[{:>2}]", cell.day)
    } else {
        format!(" {:>2} ", cell.day)
    }
}

fn year_line(summary: &MonthSummary) -> String {
    let name = NaiveDate::from_ymd_opt(summary.year, summary.month, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default();
    format!(
        "  {}  {}  {:>3}%",
        name,
        progress_bar(summary.completion_percentage as u32, 100, 20),
        summary.completion_percentage
    )
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, selector: &str, date: Option<&str>) -> Result<()> {
    let tracked = load_tracked_one(conn, selector)?;
    let reference = parse_date_arg(date)?;
    let stats = activity_stats(&tracked.completions, reference);

    println!();
    println_colored!(
        activity_color(&tracked.activity.color),
        "  {} — Statistics",
        tracked.activity.name
    );
    println_colored!(
        DIM,
        "  Started {}",
        tracked.activity.created_at.with_timezone(&Local).format("%b %-d, %Y")
    );
    println!();
    println_colored!(BOLD, "  Current streak:     {}", plural_days(stats.current_streak));
    println!("  Best streak:        {}", plural_days(stats.best_streak));
    println!("  This month:         {}", plural_days(stats.this_month));
    println!("  Total completions:  {}", stats.total);
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn export_json(conn: &Connection, selector: &str) -> Result<String> {
    let tracked = load_tracked_one(conn, selector)?;
    serde_json::to_string_pretty(&tracked).context("Serializing activity")
}

pub fn handle_export(conn: &Connection, selector: &str) -> Result<()> {
    println!("{}", export_json(conn, selector)?);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(AMBER, "  Config already exists at {}", path.display());
        } else {
            AppConfig::default().save_to(&path)?;
            log::info!("Wrote default config to {:?}", path);
            println_colored!(GREEN, "  ✓ Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    println_colored!(DIM, "  # {}", path.display());
    print!("{}", toml::to_string_pretty(config).context("Serializing config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::streaks::calendar::MONTH_ROWS;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn date(s: &str) -> NaiveDate {
        CompletionMap::parse_key(s).unwrap()
    }

    #[test]
    fn mark_done_undo_and_toggle() {
        let conn = setup();
        let config = AppConfig::default();
        let a = handle_add(&conn, &config, "Reading", None, None).unwrap();
        assert_eq!(a.color, "#06b6d4");

        assert!(handle_mark(&conn, "reading", Some("2025-05-01"), Some(true)).unwrap());
        assert!(!handle_mark(&conn, "reading", Some("2025-05-01"), None).unwrap());
        assert!(handle_mark(&conn, &a.id.to_string(), Some("2025-05-01"), None).unwrap());
        assert!(!handle_mark(&conn, "Reading", Some("2025-05-01"), Some(false)).unwrap());

        assert!(handle_mark(&conn, "Reading", Some("May 1"), Some(true)).is_err());
        assert!(handle_mark(&conn, "Writing", None, Some(true)).is_err());
    }

    #[test]
    fn clear_forgets_the_day() {
        let conn = setup();
        let a = handle_add(&conn, &AppConfig::default(), "Stretch", None, None).unwrap();
        handle_mark(&conn, "stretch", Some("2025-05-01"), Some(true)).unwrap();

        assert!(handle_clear(&conn, "stretch", Some("2025-05-01")).unwrap());
        assert!(!handle_clear(&conn, "stretch", Some("2025-05-01")).unwrap());
        assert!(CompletionRepo::completion_map(&conn, a.id).unwrap().is_empty());
    }

    #[test]
    fn rename_recolor_delete() {
        let conn = setup();
        let config = AppConfig::default();
        handle_add(&conn, &config, "Run", Some("#22c55e"), None).unwrap();

        let renamed = handle_rename(&conn, "run", "Morning run").unwrap();
        assert_eq!(renamed.name, "Morning run");
        let recolored = handle_recolor(&conn, "Morning run", "#F43F5E").unwrap();
        assert_eq!(recolored.color, "#f43f5e");
        assert!(handle_recolor(&conn, "Morning run", "rose").is_err());

        assert!(handle_delete(&conn, "morning run", true).unwrap());
        assert!(resolve_activity(&conn, "Morning run").is_err());
    }

    #[test]
    fn export_contains_history() {
        let conn = setup();
        let a = handle_add(&conn, &AppConfig::default(), "Yoga", None, Some("lotus")).unwrap();
        CompletionRepo::set_completion(&conn, a.id, date("2025-05-02"), true).unwrap();

        let json = export_json(&conn, "Yoga").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["activity"]["name"], "Yoga");
        assert_eq!(value["activity"]["icon"], "lotus");
        assert_eq!(value["completions"]["2025-05-02"], true);
    }

    #[test]
    fn week_lines_show_marks() {
        let m = CompletionMap::from_entries([("2025-05-05", true)]).unwrap();
        let lines = calendar_lines(&m, ViewGranularity::Week, date("2025-05-07"));
        assert_eq!(lines[0], "  Week of May 5 - May 11, 2025");
        assert!(lines[3].trim_start().starts_with('●'));
        assert_eq!(lines[3].matches('○').count(), 6);
        assert!(lines[4].contains("11"));
    }

    #[test]
    fn month_lines_have_six_rows() {
        let m = CompletionMap::from_entries([("2025-05-01", true)]).unwrap();
        let lines = calendar_lines(&m, ViewGranularity::Month, date("2025-05-20"));
        assert_eq!(lines[0], "  May 2025");
        let rows: Vec<_> = lines[3..3 + MONTH_ROWS].to_vec();
        assert_eq!(rows.len(), 6);
        assert!(rows[0].starts_with("    ·   ·   · [ 1]"));
    }

    #[test]
    fn year_lines_show_percentages() {
        let mut m = CompletionMap::new();
        for day in 1..=28 {
            m.insert(NaiveDate::from_ymd_opt(2025, 2, day).unwrap(), true);
        }
        let lines = calendar_lines(&m, ViewGranularity::Year, date("2025-09-01"));
        assert_eq!(lines[0], "  2025");
        assert_eq!(lines.len(), 14);
        assert!(lines[3].starts_with("  Feb"));
        assert!(lines[3].ends_with("100%"));
        assert!(lines[2].ends_with("  0%"));
    }

    #[test]
    fn list_lines_report_streaks() {
        let conn = setup();
        let config = AppConfig::default();
        let a = handle_add(&conn, &config, "Walk", None, None).unwrap();
        for d in ["2025-05-02", "2025-05-03"] {
            CompletionRepo::set_completion(&conn, a.id, date(d), true).unwrap();
        }
        let tracked = crate::db::repository::load_tracked(&conn).unwrap();
        let lines = list_lines(&tracked, date("2025-05-03"), 7);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Walk"));
        assert!(lines[0].contains("2 days streak"));
        assert!(lines[0].ends_with("○ ○ ○ ○ ○ ● ●"));
    }
}
