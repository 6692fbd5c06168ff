use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::is_weekend;
use crate::error::ValidationError;
use crate::models::FlexTimeEntry;

const SHORT_BREAK_AFTER_HOURS: f64 = 6.0;
const SHORT_BREAK_MINUTES: i32 = 30;
const LONG_BREAK_AFTER_HOURS: f64 = 9.0;
const LONG_BREAK_MINUTES: i32 = 45;
const MAX_NET_HOURS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlexViolation {
    EndNotAfterStart,
    BreakTooShort {
        required_minutes: i32,
        recorded_minutes: i32,
    },
    ExceedsMaxHours {
        net_hours: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlexDay {
    pub date: NaiveDate,
    pub target_hours: f64,
    pub actual_hours: f64,
    /// Positive means time in credit.
    pub balance: f64,
    pub violations: Vec<FlexViolation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlexSummary {
    pub user_id: Uuid,
    pub days: Vec<FlexDay>,
    pub total_target_hours: f64,
    pub total_actual_hours: f64,
    pub balance: f64,
}

impl FlexSummary {
    pub fn violation_count(&self) -> usize {
        self.days.iter().map(|day| day.violations.len()).sum()
    }
}

/// Minimum break for a given gross attendance span.
pub fn required_break_minutes(gross_hours: f64) -> i32 {
    if gross_hours > LONG_BREAK_AFTER_HOURS {
        LONG_BREAK_MINUTES
    } else if gross_hours > SHORT_BREAK_AFTER_HOURS {
        SHORT_BREAK_MINUTES
    } else {
        0
    }
}

pub fn target_hours_for(date: NaiveDate, daily_target: f64, holidays: &HashSet<NaiveDate>) -> f64 {
    if is_weekend(date) || holidays.contains(&date) {
        0.0
    } else {
        daily_target
    }
}

/// Rejects records that cannot be stored: spans that do not run forward
/// within the day and negative breaks.
pub fn validate_entry(entry: &FlexTimeEntry) -> Result<(), ValidationError> {
    if entry.end_time <= entry.start_time {
        return Err(ValidationError::EndNotAfterStart {
            start: entry.start_time,
            end: entry.end_time,
        });
    }
    if entry.break_minutes < 0 {
        return Err(ValidationError::NegativeBreak(entry.break_minutes));
    }
    Ok(())
}

pub fn evaluate_day(entry: &FlexTimeEntry, daily_target: f64, holidays: &HashSet<NaiveDate>) -> FlexDay {
    let target_hours = target_hours_for(entry.work_date, daily_target, holidays);
    let gross_minutes = (entry.end_time - entry.start_time).num_minutes();
    let mut violations = Vec::new();

    let actual_hours = if gross_minutes <= 0 {
        violations.push(FlexViolation::EndNotAfterStart);
        0.0
    } else {
        let gross_hours = gross_minutes as f64 / 60.0;
        let required = required_break_minutes(gross_hours);
        if entry.break_minutes < required {
            violations.push(FlexViolation::BreakTooShort {
                required_minutes: required,
                recorded_minutes: entry.break_minutes,
            });
        }

        let net_hours = (gross_minutes - i64::from(entry.break_minutes.max(0))).max(0) as f64 / 60.0;
        if net_hours > MAX_NET_HOURS {
            violations.push(FlexViolation::ExceedsMaxHours { net_hours });
        }
        net_hours
    };

    FlexDay {
        date: entry.work_date,
        target_hours,
        actual_hours,
        balance: actual_hours - target_hours,
        violations,
    }
}

/// Balance over the recorded days only; days without a record are not
/// charged against the target.
pub fn summarize(
    user_id: Uuid,
    entries: &[FlexTimeEntry],
    daily_target: f64,
    holidays: &HashSet<NaiveDate>,
) -> FlexSummary {
    let mut days: Vec<FlexDay> = entries
        .iter()
        .filter(|entry| entry.user_id == user_id)
        .map(|entry| evaluate_day(entry, daily_target, holidays))
        .collect();
    days.sort_by_key(|day| day.date);

    let total_target_hours = days.iter().map(|day| day.target_hours).sum();
    let total_actual_hours = days.iter().map(|day| day.actual_hours).sum();
    let balance = days.iter().map(|day| day.balance).sum();

    FlexSummary {
        user_id,
        days,
        total_target_hours,
        total_actual_hours,
        balance,
    }
}
