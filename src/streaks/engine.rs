use chrono::{Datelike, Days, NaiveDate};

use crate::models::{ActivityStats, CompletionMap, DateRange};

/// Consecutive completed days ending at `reference_date`.
///
/// Walks backward one day at a time and stops at the first day that is
/// missing or not completed, so the walk is bounded by the map's size.
pub fn current_streak(completions: &CompletionMap, reference_date: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = reference_date;
    while completions.is_completed(day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Longest run of consecutive completed days anywhere in the history.
pub fn best_streak(completions: &CompletionMap) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    // iter() yields dates in ascending order
    for (date, completed) in completions.iter() {
        if !completed {
            run = 0;
            prev = None;
            continue;
        }
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }
    best
}

/// Completed days in the same calendar month and year as `reference_date`.
pub fn month_completion_count(completions: &CompletionMap, reference_date: NaiveDate) -> u32 {
    completions
        .iter()
        .filter(|(date, completed)| {
            *completed
                && date.year() == reference_date.year()
                && date.month() == reference_date.month()
        })
        .count() as u32
}

pub fn total_completions(completions: &CompletionMap) -> u32 {
    completions.iter().filter(|(_, completed)| *completed).count() as u32
}

/// Number of days in `month` of `year`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Share of the month's days that are completed, rounded to 0..=100.
///
/// The denominator is every day of the month: absent and future days count
/// as not completed.
pub fn monthly_completion_percentage(completions: &CompletionMap, month: u32, year: i32) -> u8 {
    let (Some(days), Some(first)) = (
        days_in_month(year, month),
        NaiveDate::from_ymd_opt(year, month, 1),
    ) else {
        return 0;
    };
    let Some(last) = first.checked_add_days(Days::new(u64::from(days) - 1)) else {
        return 0;
    };
    let completed = DateRange::new(first, last)
        .days()
        .filter(|date| completions.is_completed(*date))
        .count();

    ((completed as f64 / days as f64) * 100.0).round() as u8
}

pub fn activity_stats(completions: &CompletionMap, reference_date: NaiveDate) -> ActivityStats {
    ActivityStats {
        current_streak: current_streak(completions, reference_date),
        best_streak: best_streak(completions),
        this_month: month_completion_count(completions, reference_date),
        total: total_completions(completions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        CompletionMap::parse_key(s).unwrap()
    }

    fn map(entries: &[(&str, bool)]) -> CompletionMap {
        CompletionMap::from_entries(entries.iter().copied()).unwrap()
    }

    #[test]
    fn empty_map_is_all_zero() {
        let empty = CompletionMap::new();
        let today = date("2025-05-03");
        assert_eq!(current_streak(&empty, today), 0);
        assert_eq!(best_streak(&empty), 0);
        assert_eq!(month_completion_count(&empty, today), 0);
        assert_eq!(total_completions(&empty), 0);
        assert_eq!(monthly_completion_percentage(&empty, 5, 2025), 0);
        assert_eq!(activity_stats(&empty, today), ActivityStats::default());
    }

    #[test]
    fn streak_examples() {
        let m = map(&[
            ("2025-05-01", true),
            ("2025-05-02", true),
            ("2025-05-03", false),
        ]);
        assert_eq!(current_streak(&m, date("2025-05-03")), 0);
        assert_eq!(current_streak(&m, date("2025-05-02")), 2);
        assert_eq!(current_streak(&m, date("2025-05-04")), 0);
    }

    #[test]
    fn streak_counts_run_until_first_gap() {
        let reference = date("2024-03-02");
        let mut m = CompletionMap::new();
        // 2024 is a leap year, so the run crosses Feb 29
        for back in 0..5 {
            m.insert(reference - Duration::days(back), true);
        }
        // gap at day 5, older history beyond it must not count
        for back in 6..20 {
            m.insert(reference - Duration::days(back), true);
        }
        assert_eq!(current_streak(&m, reference), 5);

        m.insert(reference - Duration::days(5), false);
        assert_eq!(current_streak(&m, reference), 5);

        m.insert(reference - Duration::days(5), true);
        assert_eq!(current_streak(&m, reference), 20);
    }

    #[test]
    fn best_streak_finds_longest_run() {
        let m = map(&[
            ("2025-01-01", true),
            ("2025-01-02", true),
            ("2025-01-03", false),
            ("2025-01-04", true),
            ("2025-01-05", true),
            ("2025-01-06", true),
            ("2025-01-08", true),
        ]);
        assert_eq!(best_streak(&m), 3);
    }

    #[test]
    fn total_ignores_key_order() {
        let forward = map(&[("2025-01-01", true), ("2025-01-02", false), ("2025-02-10", true)]);
        let backward = map(&[("2025-02-10", true), ("2025-01-02", false), ("2025-01-01", true)]);
        assert_eq!(total_completions(&forward), 2);
        assert_eq!(total_completions(&backward), 2);
    }

    #[test]
    fn month_count_requires_same_year() {
        let m = map(&[
            ("2024-12-05", true),
            ("2025-12-01", true),
            ("2025-12-02", true),
            ("2025-12-03", false),
            ("2025-11-30", true),
        ]);
        assert_eq!(month_completion_count(&m, date("2025-12-20")), 2);
        assert_eq!(month_completion_count(&m, date("2024-12-01")), 1);
    }

    #[test]
    fn percentage_uses_full_month_as_denominator() {
        let mut june = CompletionMap::new();
        assert_eq!(monthly_completion_percentage(&june, 6, 2025), 0);
        for day in 1..=30 {
            june.insert(NaiveDate::from_ymd_opt(2025, 6, day).unwrap(), true);
        }
        assert_eq!(monthly_completion_percentage(&june, 6, 2025), 100);

        let mut feb = CompletionMap::new();
        for day in 1..=28 {
            feb.insert(NaiveDate::from_ymd_opt(2025, 2, day).unwrap(), true);
        }
        assert_eq!(monthly_completion_percentage(&feb, 2, 2025), 100);
        feb.insert(date("2025-02-14"), false);
        assert_eq!(monthly_completion_percentage(&feb, 2, 2025), 96);

        let one_day = map(&[("2025-01-01", true)]);
        // 1/31 rounds to 3
        assert_eq!(monthly_completion_percentage(&one_day, 1, 2025), 3);
        assert_eq!(monthly_completion_percentage(&one_day, 13, 2025), 0);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 0), None);
    }
}
