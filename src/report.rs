use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{is_weekend, DateWindow};
use crate::coverage::staff_by_type;
use crate::fairness;
use crate::models::{FairnessScore, ImbalanceLevel, Profile, ScheduleEntry, ShiftType};

#[derive(Debug, Clone, Serialize)]
pub struct DigestDay {
    pub date: NaiveDate,
    pub staff: BTreeMap<ShiftType, u32>,
    pub understaffed: Vec<ShiftType>,
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Staffing for the seven days from `monday`.
///
/// A shift type is checked against `required_staff` only if the team works
/// it at some point that week. Weekend days without any work entry are
/// treated as closed.
pub fn weekly_coverage(monday: NaiveDate, entries: &[ScheduleEntry], required_staff: u32) -> Vec<DigestDay> {
    let week_end = monday + Duration::days(6);
    let in_use: BTreeSet<ShiftType> = entries
        .iter()
        .filter(|e| e.is_work() && e.date >= monday && e.date <= week_end)
        .map(|e| e.shift_type)
        .collect();

    monday
        .iter_days()
        .take(7)
        .map(|date| {
            let staff = staff_by_type(entries, date);
            let closed = is_weekend(date) && staff.is_empty();
            let understaffed = if closed {
                Vec::new()
            } else {
                in_use
                    .iter()
                    .copied()
                    .filter(|t| staff.get(t).copied().unwrap_or(0) < required_staff)
                    .collect()
            };
            DigestDay {
                date,
                staff,
                understaffed,
            }
        })
        .collect()
}

fn display_name(profiles: &HashMap<Uuid, Profile>, user_id: Uuid) -> String {
    profiles
        .get(&user_id)
        .map(Profile::full_name)
        .unwrap_or_else(|| user_id.to_string())
}

pub fn build_fairness_report(
    team_name: &str,
    window: DateWindow,
    scores: &[FairnessScore],
    profiles: &HashMap<Uuid, Profile>,
) -> String {
    let mut ordered = scores.to_vec();
    fairness::sort_by_burden(&mut ordered);

    let mut output = String::new();
    let _ = writeln!(output, "# Shift Fairness Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} to {})",
        team_name, window.start, window.end
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Imbalance");

    if ordered.is_empty() {
        let _ = writeln!(output, "No team members to analyse.");
        return output;
    }

    for level in [ImbalanceLevel::High, ImbalanceLevel::Medium, ImbalanceLevel::Low] {
        let names: Vec<String> = ordered
            .iter()
            .filter(|s| s.imbalance_level == level)
            .map(|s| display_name(profiles, s.user_id))
            .collect();
        let listed = if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        };
        let _ = writeln!(output, "- {}: {}", level, listed);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Burden by Member");
    let _ = writeln!(
        output,
        "| Member | Weekend (past/future) | Night (past/future) | Holiday (past/future) | Weighted | Fairness |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|");
    for score in ordered.iter() {
        let _ = writeln!(
            output,
            "| {} | {}/{} | {}/{} | {}/{} | {:.1} | {:.0} |",
            display_name(profiles, score.user_id),
            score.past_weekend,
            score.future_weekend,
            score.past_night,
            score.future_night,
            score.past_holiday,
            score.future_holiday,
            score.total_weighted,
            score.fairness_score
        );
    }

    output
}

pub fn build_weekly_digest(team_name: &str, days: &[DigestDay]) -> String {
    let mut output = String::new();
    let start = days.first().map(|d| d.date);
    let _ = match start {
        Some(start) => writeln!(output, "Duty coverage for {} (week of {})", team_name, start),
        None => writeln!(output, "Duty coverage for {}", team_name),
    };
    let _ = writeln!(output);

    for day in days {
        let staffed = if day.staff.is_empty() {
            "no one scheduled".to_string()
        } else {
            day.staff
                .iter()
                .map(|(shift_type, count)| format!("{shift_type} {count}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = write!(output, "- {} {}: {}", day.date.format("%a"), day.date, staffed);
        if !day.understaffed.is_empty() {
            let short: Vec<&str> = day.understaffed.iter().map(|t| t.as_str()).collect();
            let _ = write!(output, " (understaffed: {})", short.join(", "));
        }
        let _ = writeln!(output);
    }

    let flagged = days.iter().filter(|d| !d.understaffed.is_empty()).count();
    let _ = writeln!(output);
    let _ = writeln!(output, "{} day(s) below minimum staffing.", flagged);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn work(on: NaiveDate, shift_type: ShiftType) -> ScheduleEntry {
        ScheduleEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            date: on,
            shift_type,
            activity_type: ActivityType::Work,
            note: None,
        }
    }

    fn score(user_id: Uuid, total: f64, fairness: f64, level: ImbalanceLevel) -> FairnessScore {
        FairnessScore {
            user_id,
            past_weekend: 1,
            past_night: 0,
            past_holiday: 0,
            future_weekend: 0,
            future_night: 2,
            future_holiday: 0,
            total_weighted: total,
            fairness_score: fairness,
            imbalance_level: level,
        }
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(date(2026, 3, 12)), date(2026, 3, 9));
        assert_eq!(week_start(date(2026, 3, 9)), date(2026, 3, 9));
        assert_eq!(week_start(date(2026, 3, 15)), date(2026, 3, 9));
    }

    #[test]
    fn flags_days_below_minimum_for_used_shift_types() {
        let monday = date(2026, 3, 9);
        let tuesday = date(2026, 3, 10);
        let entries = vec![
            work(monday, ShiftType::Early),
            work(monday, ShiftType::Early),
            work(monday, ShiftType::Late),
            work(monday, ShiftType::Late),
            work(tuesday, ShiftType::Early),
            work(tuesday, ShiftType::Early),
            work(tuesday, ShiftType::Late),
        ];

        let days = weekly_coverage(monday, &entries, 2);
        assert_eq!(days.len(), 7);
        assert!(days[0].understaffed.is_empty());
        assert_eq!(days[1].understaffed, vec![ShiftType::Late]);
        // Saturday and Sunday have nobody scheduled and count as closed
        assert!(days[5].understaffed.is_empty());
        assert!(days[6].understaffed.is_empty());
        // Wednesday to Friday are open weekdays with nobody on either shift
        assert_eq!(days[2].understaffed, vec![ShiftType::Early, ShiftType::Late]);
    }

    #[test]
    fn digest_lists_every_day_and_flag_count() {
        let monday = date(2026, 3, 9);
        let entries = vec![work(monday, ShiftType::Normal)];
        let days = weekly_coverage(monday, &entries, 1);
        let digest = build_weekly_digest("Dispatch", &days);

        assert!(digest.starts_with("Duty coverage for Dispatch (week of 2026-03-09)"));
        assert!(digest.contains("- Mon 2026-03-09: normal 1"));
        assert!(digest.contains("- Tue 2026-03-10: no one scheduled (understaffed: normal)"));
        assert!(digest.contains("4 day(s) below minimum staffing."));
    }

    #[test]
    fn fairness_report_orders_by_burden() {
        let (light, heavy) = (Uuid::new_v4(), Uuid::new_v4());
        let profiles: HashMap<Uuid, Profile> = [
            (
                heavy,
                Profile {
                    id: heavy,
                    first_name: "Jules".to_string(),
                    last_name: "Moreno".to_string(),
                    email: "jules@example.com".to_string(),
                },
            ),
        ]
        .into_iter()
        .collect();
        let scores = vec![
            score(light, 1.5, 100.0, ImbalanceLevel::Low),
            score(heavy, 7.5, 0.0, ImbalanceLevel::High),
        ];
        let window = DateWindow {
            start: date(2026, 1, 1),
            end: date(2026, 3, 31),
        };

        let report = build_fairness_report("Dispatch", window, &scores, &profiles);
        assert!(report.contains("Generated for Dispatch (2026-01-01 to 2026-03-31)"));
        assert!(report.contains("- high: Jules Moreno"));
        assert!(report.contains("- medium: none"));
        let heavy_row = report.find("| Jules Moreno |").unwrap();
        let light_row = report.find(&format!("| {light} |")).unwrap();
        assert!(heavy_row < light_row);
        assert!(report.contains("| Jules Moreno | 1/0 | 0/2 | 0/0 | 7.5 | 0 |"));
    }

    #[test]
    fn empty_cohort_report_says_so() {
        let window = DateWindow {
            start: date(2026, 1, 1),
            end: date(2026, 1, 31),
        };
        let report = build_fairness_report("Dispatch", window, &[], &HashMap::new());
        assert!(report.contains("No team members to analyse."));
    }
}
