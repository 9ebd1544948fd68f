//! Consecutive-day streak transition.
//!
//! Days are whole UTC calendar days, never timestamps:
//! - last update yesterday → streak grows by one
//! - last update today → unchanged (second vouch the same day)
//! - anything else (gap, unset, future) → streak restarts at 1

use chrono::NaiveDate;

/// Compute the streak after a vouch received on `today`.
pub fn next_streak(last_day: Option<NaiveDate>, streak: u32, today: NaiveDate) -> u32 {
    match last_day {
        Some(last) if Some(last) == today.pred_opt() => streak.saturating_add(1),
        Some(last) if last == today => streak,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn first_vouch_starts_streak() {
        assert_eq!(next_streak(None, 0, day("2024-01-01")), 1);
    }

    #[test]
    fn consecutive_day_extends() {
        assert_eq!(next_streak(Some(day("2024-01-01")), 1, day("2024-01-02")), 2);
        // Across month and year boundaries
        assert_eq!(next_streak(Some(day("2024-01-31")), 4, day("2024-02-01")), 5);
        assert_eq!(next_streak(Some(day("2023-12-31")), 9, day("2024-01-01")), 10);
        assert_eq!(next_streak(Some(day("2024-02-28")), 1, day("2024-02-29")), 2);
    }

    #[test]
    fn same_day_keeps_streak() {
        assert_eq!(next_streak(Some(day("2024-01-02")), 2, day("2024-01-02")), 2);
    }

    #[test]
    fn gap_resets() {
        assert_eq!(next_streak(Some(day("2024-01-02")), 2, day("2024-01-04")), 1);
    }

    #[test]
    fn clock_going_backwards_resets() {
        assert_eq!(next_streak(Some(day("2024-01-05")), 3, day("2024-01-04")), 1);
    }

    proptest! {
        #[test]
        fn streak_law(offset in 0i64..20_000, gap in 2i64..400, streak in 0u32..1_000) {
            let base = day("1990-01-01");
            let today = base + chrono::Duration::days(offset + 400);
            let yesterday = today.pred_opt().unwrap();

            prop_assert_eq!(next_streak(Some(yesterday), streak, today), streak + 1);
            prop_assert_eq!(next_streak(Some(today), streak, today), streak);
            prop_assert_eq!(
                next_streak(Some(today - chrono::Duration::days(gap)), streak, today),
                1
            );
            prop_assert_eq!(next_streak(None, streak, today), 1);
        }
    }
}
