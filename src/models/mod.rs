pub mod activity;
pub mod calendar;
pub mod completion;
pub mod stats;

pub use activity::{Activity, CompletionRecord, TrackedActivity};
pub use calendar::{CalendarCell, DateRange, MonthSummary, ViewGranularity};
pub use completion::{CompletionMap, DATE_FORMAT};
pub use stats::ActivityStats;
