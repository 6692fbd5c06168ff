use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use crate::models::{ScheduleEntry, ShiftCount, ShiftHistory, ShiftType};

/// Inclusive date range an analysis looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Window reaching `past_days` back and `future_days` ahead of `today`.
pub fn analysis_window(today: NaiveDate, past_days: i64, future_days: i64) -> DateWindow {
    DateWindow {
        start: today - Duration::days(past_days.max(0)),
        end: today + Duration::days(future_days.max(0)),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Per-user weekend/night/holiday counts, split into shifts before `today`
/// and shifts on or after it.
///
/// Only work entries of `team_id` inside `window` count, and one entry can
/// land in several categories. Every user in `users` is returned, in order,
/// even when they have no entries.
pub fn count_shifts(
    users: &[Uuid],
    team_id: Uuid,
    window: DateWindow,
    entries: &[ScheduleEntry],
    holidays: &HashSet<NaiveDate>,
    today: NaiveDate,
) -> Vec<ShiftHistory> {
    let mut histories: HashMap<Uuid, ShiftHistory> = users
        .iter()
        .map(|&user_id| {
            (
                user_id,
                ShiftHistory {
                    user_id,
                    historical: ShiftCount::empty(user_id),
                    future: ShiftCount::empty(user_id),
                },
            )
        })
        .collect();

    for entry in entries {
        if entry.team_id != team_id || !entry.is_work() || !window.contains(entry.date) {
            continue;
        }
        let Some(history) = histories.get_mut(&entry.user_id) else {
            continue;
        };

        let count = if entry.date < today {
            &mut history.historical
        } else {
            &mut history.future
        };

        if is_weekend(entry.date) {
            count.weekend_shifts_count += 1;
        }
        if entry.shift_type == ShiftType::Night {
            count.night_shifts_count += 1;
        }
        if holidays.contains(&entry.date) {
            count.holiday_shifts_count += 1;
        }
    }

    users
        .iter()
        .filter_map(|user_id| histories.remove(user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(user_id: Uuid, team_id: Uuid, on: NaiveDate, shift_type: ShiftType) -> ScheduleEntry {
        ScheduleEntry {
            id: Uuid::new_v4(),
            user_id,
            team_id,
            date: on,
            shift_type,
            activity_type: ActivityType::Work,
            note: None,
        }
    }

    #[test]
    fn window_spans_both_directions() {
        let window = analysis_window(date(2026, 3, 10), 7, 3);
        assert_eq!(window.start, date(2026, 3, 3));
        assert_eq!(window.end, date(2026, 3, 13));
        assert!(window.contains(date(2026, 3, 13)));
        assert!(!window.contains(date(2026, 3, 14)));
    }

    #[test]
    fn splits_past_and_future_at_today() {
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let today = date(2026, 3, 11);
        // 2026-03-07 is a Saturday, 2026-03-14 is a Saturday.
        let entries = vec![
            entry(user, team, date(2026, 3, 7), ShiftType::Normal),
            entry(user, team, date(2026, 3, 14), ShiftType::Night),
            entry(user, team, today, ShiftType::Night),
        ];
        let window = analysis_window(today, 30, 30);

        let counts = count_shifts(&[user], team, window, &entries, &HashSet::new(), today);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].historical.weekend_shifts_count, 1);
        assert_eq!(counts[0].historical.night_shifts_count, 0);
        assert_eq!(counts[0].future.weekend_shifts_count, 1);
        assert_eq!(counts[0].future.night_shifts_count, 2);
    }

    #[test]
    fn one_entry_counts_in_every_matching_category() {
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let saturday = date(2025, 12, 27);
        let holidays: HashSet<NaiveDate> = [saturday].into_iter().collect();
        let entries = vec![entry(user, team, saturday, ShiftType::Night)];
        let today = date(2026, 1, 5);

        let counts = count_shifts(
            &[user],
            team,
            analysis_window(today, 60, 0),
            &entries,
            &holidays,
            today,
        );
        let past = counts[0].historical;
        assert_eq!(
            (past.weekend_shifts_count, past.night_shifts_count, past.holiday_shifts_count),
            (1, 1, 1)
        );
    }

    #[test]
    fn ignores_other_teams_leave_and_out_of_window_entries() {
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let today = date(2026, 3, 11);
        let mut vacation = entry(user, team, date(2026, 3, 7), ShiftType::Night);
        vacation.activity_type = ActivityType::Vacation;
        let entries = vec![
            entry(user, Uuid::new_v4(), date(2026, 3, 7), ShiftType::Night),
            vacation,
            entry(user, team, date(2025, 1, 4), ShiftType::Night),
        ];

        let counts = count_shifts(
            &[user],
            team,
            analysis_window(today, 30, 30),
            &entries,
            &HashSet::new(),
            today,
        );
        assert_eq!(counts[0].historical, ShiftCount::empty(user));
        assert_eq!(counts[0].future, ShiftCount::empty(user));
    }

    #[test]
    fn keeps_members_without_entries_in_order() {
        let team = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let today = date(2026, 3, 11);
        let entries = vec![entry(second, team, date(2026, 3, 8), ShiftType::Early)];

        let counts = count_shifts(
            &[first, second],
            team,
            analysis_window(today, 30, 30),
            &entries,
            &HashSet::new(),
            today,
        );
        assert_eq!(counts[0].user_id, first);
        assert_eq!(counts[1].user_id, second);
        assert_eq!(counts[1].historical.weekend_shifts_count, 1);
    }
}
