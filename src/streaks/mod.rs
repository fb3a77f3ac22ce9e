pub mod calendar;
pub mod engine;

pub use calendar::{CalendarView, build_view, date_range, recent_days, shift_reference};
pub use engine::{activity_stats, current_streak};
