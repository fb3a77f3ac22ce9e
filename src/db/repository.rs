use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Activity, CompletionMap, CompletionRecord, TrackedActivity, DATE_FORMAT};
use crate::utils::format::normalize_color;

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Bad timestamp '{}': {}", s, e))
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Trimmed name, rejecting blanks and bare numbers (those select by id).
fn clean_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Please enter an activity name");
    }
    if name.parse::<i64>().is_ok() {
        bail!("Activity names can't be just a number, '{}' would look like an id", name);
    }
    Ok(name)
}

// ─── Activity repo ───────────────────────────────────────────────────────────

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ActivityUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
}

pub struct ActivityRepo;

type ActivityRow = (i64, String, String, Option<String>, String);

impl ActivityRepo {
    const COLUMNS: &'static str = "id, name, color, icon, created_at";

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
        ))
    }

    fn into_activity((id, name, color, icon, created_at): ActivityRow) -> Result<Activity> {
        Ok(Activity {
            id,
            name,
            color,
            icon,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    /// All activities, newest first.
    pub fn list(conn: &Connection) -> Result<Vec<Activity>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities ORDER BY created_at DESC, id DESC",
            Self::COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::read_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(Self::into_activity(r?)?);
        }
        Ok(result)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Activity>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM activities WHERE id = ?1", Self::COLUMNS),
                params![id],
                Self::read_row,
            )
            .optional()?;
        row.map(Self::into_activity).transpose()
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Activity>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM activities WHERE name = ?1 COLLATE NOCASE",
                    Self::COLUMNS
                ),
                params![name.trim()],
                Self::read_row,
            )
            .optional()?;
        row.map(Self::into_activity).transpose()
    }

    /// Look up by numeric id first, then by case-insensitive name.
    pub fn find(conn: &Connection, selector: &str) -> Result<Option<Activity>> {
        if let Ok(id) = selector.trim().parse::<i64>() {
            if let Some(activity) = Self::get(conn, id)? {
                return Ok(Some(activity));
            }
        }
        Self::find_by_name(conn, selector)
    }

    pub fn create(
        conn: &Connection,
        name: &str,
        color: &str,
        icon: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Activity> {
        let name = clean_name(name)?;
        let color = normalize_color(color)?;
        if Self::find_by_name(conn, name)?.is_some() {
            bail!("An activity named '{}' already exists", name);
        }

        conn.execute(
            "INSERT INTO activities (name, color, icon, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, color, icon, created_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        log::debug!("Inserted activity {} ({})", id, name);

        Self::get(conn, id)?.ok_or_else(|| anyhow!("Activity {} vanished after insert", id))
    }

    pub fn update(conn: &Connection, id: i64, update: &ActivityUpdate) -> Result<Activity> {
        let current = Self::get(conn, id)?.ok_or_else(|| anyhow!("Activity {} not found", id))?;

        let name = match &update.name {
            Some(n) => {
                let n = clean_name(n)?;
                if let Some(other) = Self::find_by_name(conn, n)? {
                    if other.id != id {
                        bail!("An activity named '{}' already exists", n);
                    }
                }
                n.to_string()
            }
            None => current.name,
        };
        let color = match &update.color {
            Some(c) => normalize_color(c)?,
            None => current.color,
        };
        let icon = update.icon.clone().unwrap_or(current.icon);

        conn.execute(
            "UPDATE activities SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4",
            params![name, color, icon, id],
        )?;
        log::debug!("Updated activity {}", id);

        Self::get(conn, id)?.ok_or_else(|| anyhow!("Activity {} not found", id))
    }

    /// Deletes the activity and its completion history. Returns false if
    /// nothing matched.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        // Explicit so history goes even if foreign keys are off.
        conn.execute("DELETE FROM completions WHERE activity_id = ?1", params![id])?;
        let removed = conn.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        log::debug!("Deleted activity {} ({} rows)", id, removed);
        Ok(removed > 0)
    }
}

// ─── Completion repo ─────────────────────────────────────────────────────────

pub struct CompletionRepo;

impl CompletionRepo {
    pub fn completion_map(conn: &Connection, activity_id: i64) -> Result<CompletionMap> {
        let mut stmt = conn.prepare(
            "SELECT date, completed FROM completions WHERE activity_id = ?1 ORDER BY date DESC",
        )?;
        let rows = stmt
            .query_map(params![activity_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)? != 0))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        CompletionMap::from_entries(rows)
            .with_context(|| format!("Loading completions for activity {}", activity_id))
    }

    fn get_record(
        conn: &Connection,
        activity_id: i64,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>> {
        conn.query_row(
            "SELECT id, completed FROM completions WHERE activity_id = ?1 AND date = ?2",
            params![activity_id, date_key(date)],
            |row| {
                Ok(CompletionRecord {
                    id: row.get(0)?,
                    activity_id,
                    date,
                    completed: row.get::<_, i32>(1)? != 0,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set_completion(
        conn: &Connection,
        activity_id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<CompletionRecord> {
        conn.execute(
            "INSERT INTO completions (activity_id, date, completed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(activity_id, date) DO UPDATE SET completed = ?3",
            params![activity_id, date_key(date), completed as i32],
        )
        .with_context(|| format!("Updating completion for activity {}", activity_id))?;
        log::debug!("Activity {} {} -> {}", activity_id, date, completed);

        Self::get_record(conn, activity_id, date)?
            .ok_or_else(|| anyhow!("Completion for {} vanished after write", date))
    }

    /// Flip the stored value; an absent day becomes completed.
    pub fn toggle(conn: &Connection, activity_id: i64, date: NaiveDate) -> Result<CompletionRecord> {
        let was_done = Self::get_record(conn, activity_id, date)?
            .map(|r| r.completed)
            .unwrap_or(false);
        Self::set_completion(conn, activity_id, date, !was_done)
    }

    pub fn clear(conn: &Connection, activity_id: i64, date: NaiveDate) -> Result<bool> {
        let removed = conn.execute(
            "DELETE FROM completions WHERE activity_id = ?1 AND date = ?2",
            params![activity_id, date_key(date)],
        )?;
        Ok(removed > 0)
    }
}

/// Every activity paired with its completion history, newest first.
pub fn load_tracked(conn: &Connection) -> Result<Vec<TrackedActivity>> {
    ActivityRepo::list(conn)?
        .into_iter()
        .map(|activity| {
            let completions = CompletionRepo::completion_map(conn, activity.id)?;
            Ok(TrackedActivity::new(activity, completions))
        })
        .collect()
}
