use chrono::{Datelike, Days, Duration, Months, NaiveDate};

use crate::models::{CalendarCell, CompletionMap, DateRange, MonthSummary, ViewGranularity};
use crate::streaks::engine::monthly_completion_percentage;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Rows in the month grid. Fixed so every month renders at the same height.
pub const MONTH_ROWS: usize = 6;

/// Cells for one granularity, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum CalendarView {
    Week([CalendarCell; 7]),
    Month([[CalendarCell; 7]; MONTH_ROWS]),
    Year(Vec<MonthSummary>),
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn date_range(granularity: ViewGranularity, reference_date: NaiveDate) -> DateRange {
    match granularity {
        ViewGranularity::Week => {
            let start = week_start(reference_date);
            DateRange::new(start, start + Duration::days(6))
        }
        ViewGranularity::Month => {
            DateRange::new(month_start(reference_date), month_end(reference_date))
        }
        ViewGranularity::Year => {
            let year = reference_date.year();
            DateRange::new(
                NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(reference_date),
                NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(reference_date),
            )
        }
    }
}

fn cell(completions: &CompletionMap, date: NaiveDate, in_period: bool) -> CalendarCell {
    CalendarCell {
        date,
        day: date.day(),
        in_period,
        completed: completions.is_completed(date),
    }
}

/// Monday..Sunday of the week containing `reference_date`.
pub fn build_week(completions: &CompletionMap, reference_date: NaiveDate) -> [CalendarCell; 7] {
    let start = week_start(reference_date);
    std::array::from_fn(|i| cell(completions, start + Duration::days(i as i64), true))
}

/// Six Monday-first rows starting at the week that holds the 1st.
/// Padding days from neighbouring months have `in_period == false`.
pub fn build_month(
    completions: &CompletionMap,
    reference_date: NaiveDate,
) -> [[CalendarCell; 7]; MONTH_ROWS] {
    let month = date_range(ViewGranularity::Month, reference_date);
    let grid_start = week_start(month.start);
    std::array::from_fn(|row| {
        std::array::from_fn(|col| {
            let date = grid_start + Duration::days((row * 7 + col) as i64);
            cell(completions, date, month.contains(date))
        })
    })
}

/// January..December of the reference year with completion percentages.
pub fn build_year(completions: &CompletionMap, reference_date: NaiveDate) -> Vec<MonthSummary> {
    let year = reference_date.year();
    (1..=12)
        .map(|month| MonthSummary {
            year,
            month,
            completion_percentage: monthly_completion_percentage(completions, month, year),
        })
        .collect()
}

pub fn build_view(
    completions: &CompletionMap,
    granularity: ViewGranularity,
    reference_date: NaiveDate,
) -> CalendarView {
    match granularity {
        ViewGranularity::Week => CalendarView::Week(build_week(completions, reference_date)),
        ViewGranularity::Month => CalendarView::Month(build_month(completions, reference_date)),
        ViewGranularity::Year => CalendarView::Year(build_year(completions, reference_date)),
    }
}

/// The trailing `count` days ending at `reference_date`, oldest first.
/// Stops early at the start of the supported date range.
pub fn recent_days(
    completions: &CompletionMap,
    reference_date: NaiveDate,
    count: usize,
) -> Vec<CalendarCell> {
    let mut days: Vec<CalendarCell> = (0..count as u64)
        .map_while(|back| reference_date.checked_sub_days(Days::new(back)))
        .map(|date| cell(completions, date, true))
        .collect();
    days.reverse();
    days
}

/// Move `date` by `steps` periods of `granularity`. Month and year moves
/// clamp the day to the target month's length.
pub fn shift_reference(granularity: ViewGranularity, date: NaiveDate, steps: i32) -> NaiveDate {
    let months = match granularity {
        ViewGranularity::Week => return date + Duration::weeks(steps as i64),
        ViewGranularity::Month => steps,
        ViewGranularity::Year => steps.saturating_mul(12),
    };
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        CompletionMap::parse_key(s).unwrap()
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        let m = CompletionMap::from_entries([("2025-05-05", true), ("2025-05-11", true)]).unwrap();
        // Wednesday
        let week = build_week(&m, date("2025-05-07"));
        assert_eq!(week[0].date, date("2025-05-05"));
        assert_eq!(week[0].date.weekday(), Weekday::Mon);
        assert_eq!(week[6].date, date("2025-05-11"));
        assert!(week[0].completed && week[6].completed);
        assert_eq!(week.iter().filter(|c| c.completed).count(), 2);
        assert!(week.iter().all(|c| c.in_period));

        // Sunday belongs to the week that started the previous Monday
        assert_eq!(build_week(&m, date("2025-05-11"))[0].date, date("2025-05-05"));
        assert_eq!(build_week(&m, date("2025-05-05"))[0].date, date("2025-05-05"));
    }

    #[test]
    fn month_grid_is_always_six_by_seven() {
        let m = CompletionMap::from_entries([("2025-05-01", true), ("2025-04-30", true)]).unwrap();
        for reference in ["2025-05-15", "2026-02-01", "2015-02-10", "2024-12-31", "2023-09-09"] {
            let grid = build_month(&m, date(reference));
            let cells: Vec<_> = grid.iter().flatten().collect();
            assert_eq!(cells.len(), 42);
            assert_eq!(cells[0].date.weekday(), Weekday::Mon);
            let in_month = cells.iter().filter(|c| c.in_period).count() as u32;
            let r = date(reference);
            assert_eq!(
                Some(in_month),
                crate::streaks::engine::days_in_month(r.year(), r.month())
            );
        }
    }

    #[test]
    fn month_grid_flags_padding_days() {
        let m = CompletionMap::from_entries([("2025-05-01", true), ("2025-04-30", true)]).unwrap();
        let grid = build_month(&m, date("2025-05-20"));

        // May 2025 starts on a Thursday
        assert_eq!(grid[0][0].date, date("2025-04-28"));
        assert!(!grid[0][0].in_period);
        let apr30 = grid[0][2];
        assert_eq!(apr30.day, 30);
        assert!(apr30.completed && !apr30.in_period);
        let may1 = grid[0][3];
        assert_eq!(may1.day, 1);
        assert!(may1.completed && may1.in_period);
        assert_eq!(grid[5][6].date, date("2025-06-08"));
        assert!(!grid[5][6].in_period);
    }

    #[test]
    fn february_starting_monday_pads_two_trailing_weeks() {
        // Feb 2021: 28 days starting on a Monday
        let grid = build_month(&CompletionMap::new(), date("2021-02-14"));
        assert_eq!(grid[0][0].date, date("2021-02-01"));
        assert!(grid[3].iter().all(|c| c.in_period));
        assert!(grid[4].iter().chain(grid[5].iter()).all(|c| !c.in_period));
    }

    #[test]
    fn year_has_twelve_months_in_order() {
        let mut m = CompletionMap::new();
        for day in 1..=28 {
            m.insert(NaiveDate::from_ymd_opt(2025, 2, day).unwrap(), true);
        }
        m.insert(date("2024-02-01"), true);
        let year = build_year(&m, date("2025-07-04"));
        assert_eq!(year.len(), 12);
        assert!(year.iter().enumerate().all(|(i, s)| s.month == i as u32 + 1 && s.year == 2025));
        assert_eq!(year[1].completion_percentage, 100);
        assert_eq!(year[0].completion_percentage, 0);
    }

    #[test]
    fn ranges_per_granularity() {
        let d = date("2024-02-14");
        assert_eq!(
            date_range(ViewGranularity::Week, d),
            DateRange::new(date("2024-02-12"), date("2024-02-18"))
        );
        assert_eq!(
            date_range(ViewGranularity::Month, d),
            DateRange::new(date("2024-02-01"), date("2024-02-29"))
        );
        let year = date_range(ViewGranularity::Year, d);
        assert_eq!(year, DateRange::new(date("2024-01-01"), date("2024-12-31")));
        assert_eq!(year.days().count(), 366);
        assert!(year.contains(date("2024-12-31")));
        assert!(!year.contains(date("2025-01-01")));
    }

    #[test]
    fn recent_days_end_at_reference() {
        let m = CompletionMap::from_entries([("2025-05-03", true)]).unwrap();
        let days = recent_days(&m, date("2025-05-03"), 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, date("2025-04-27"));
        assert!(days[6].completed);
    }

    #[test]
    fn recent_days_stop_at_earliest_date() {
        let m = CompletionMap::default();
        let start = NaiveDate::MIN + Duration::days(2);
        let days = recent_days(&m, start, 10);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::MIN);
        assert_eq!(days[2].date, start);
    }

    #[test]
    fn shifting_clamps_to_month_end() {
        let d = date("2025-01-31");
        assert_eq!(shift_reference(ViewGranularity::Month, d, 1), date("2025-02-28"));
        assert_eq!(shift_reference(ViewGranularity::Month, d, -2), date("2024-11-30"));
        assert_eq!(shift_reference(ViewGranularity::Week, d, -1), date("2025-01-24"));
        assert_eq!(
            shift_reference(ViewGranularity::Year, date("2024-02-29"), 1),
            date("2025-02-28")
        );
    }
}
