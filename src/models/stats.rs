use serde::{Deserialize, Serialize};

/// Headline numbers for one activity, all derived from its completion map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub current_streak: u32,
    pub best_streak: u32,
    pub this_month: u32,
    pub total: u32,
}
