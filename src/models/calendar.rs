use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Time window used for calendar rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewGranularity {
    #[default]
    Week,
    Month,
    Year,
}

impl ViewGranularity {
    pub fn all() -> [ViewGranularity; 3] {
        [
            ViewGranularity::Week,
            ViewGranularity::Month,
            ViewGranularity::Year,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewGranularity::Week => "week",
            ViewGranularity::Month => "month",
            ViewGranularity::Year => "year",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ViewGranularity::Week => "Week",
            ViewGranularity::Month => "Month",
            ViewGranularity::Year => "Year",
        }
    }

    pub fn next(&self) -> ViewGranularity {
        match self {
            ViewGranularity::Week => ViewGranularity::Month,
            ViewGranularity::Month => ViewGranularity::Year,
            ViewGranularity::Year => ViewGranularity::Week,
        }
    }
}

impl std::fmt::Display for ViewGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewGranularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "w" => Ok(ViewGranularity::Week),
            "month" | "m" => Ok(ViewGranularity::Month),
            "year" | "y" => Ok(ViewGranularity::Year),
            _ => Err(anyhow::anyhow!("Unknown view: {} (use week, month or year)", s)),
        }
    }
}

/// A single rendered day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub day: u32,
    /// False for padding days borrowed from adjacent months.
    pub in_period: bool,
    pub completed: bool,
}

/// Inclusive start/end bounding a granularity's visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub completion_percentage: u8,
}
