use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CompletionMap;

/// Colors offered when creating an activity (teal, sky, violet, pink,
/// orange, green, rose).
pub const PALETTE: [&str; 7] = [
    "#06b6d4", "#0ea5e9", "#8b5cf6", "#ec4899", "#f97316", "#22c55e", "#f43f5e",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored completion row as returned after a write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: i64,
    pub activity_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
}

/// An activity paired with its full completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedActivity {
    pub activity: Activity,
    pub completions: CompletionMap,
}

impl TrackedActivity {
    pub fn new(activity: Activity, completions: CompletionMap) -> Self {
        Self {
            activity,
            completions,
        }
    }
}
