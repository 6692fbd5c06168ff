use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Normal,
    Early,
    Late,
    Night,
}

impl ShiftType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Early => "early",
            Self::Late => "late",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "early" => Ok(Self::Early),
            "late" => Ok(Self::Late),
            "night" => Ok(Self::Night),
            other => Err(ValidationError::UnknownShiftType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Work,
    Vacation,
    Sick,
    Training,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Vacation => "vacation",
            Self::Sick => "sick",
            Self::Training => "training",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "vacation" => Ok(Self::Vacation),
            "sick" => Ok(Self::Sick),
            "training" => Ok(Self::Training),
            other => Err(ValidationError::UnknownActivityType(other.to_string())),
        }
    }
}

/// Lifecycle shared by swap and vacation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ImbalanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub min_staff_per_shift: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub activity_type: ActivityType,
    pub note: Option<String>,
}

impl ScheduleEntry {
    pub fn is_work(&self) -> bool {
        self.activity_type == ActivityType::Work
    }
}

/// A schedule entry joined with the names needed to print or export it.
#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub entry: ScheduleEntry,
    pub user_name: String,
    pub email: String,
    pub team_name: String,
}

/// Weekend, night and holiday shifts for one user inside one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftCount {
    pub user_id: Uuid,
    pub weekend_shifts_count: u32,
    pub night_shifts_count: u32,
    pub holiday_shifts_count: u32,
}

impl ShiftCount {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// Counts for a user split at "today": already worked vs already planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftHistory {
    pub user_id: Uuid,
    pub historical: ShiftCount,
    pub future: ShiftCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FairnessScore {
    pub user_id: Uuid,
    pub past_weekend: u32,
    pub past_night: u32,
    pub past_holiday: u32,
    pub future_weekend: u32,
    pub future_night: u32,
    pub future_holiday: u32,
    pub total_weighted: f64,
    pub fairness_score: f64,
    pub imbalance_level: ImbalanceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSnapshot {
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub current_staff: u32,
    pub after_swap_staff: u32,
    pub required_staff: u32,
}

impl CoverageSnapshot {
    pub fn below_minimum(&self) -> bool {
        self.after_swap_staff < self.required_staff
    }
}

#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub id: Uuid,
    pub team_id: Uuid,
    pub requester_id: Uuid,
    pub requester_entry_id: Uuid,
    pub target_id: Uuid,
    pub target_entry_id: Uuid,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VacationRequest {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FlexTimeEntry {
    pub user_id: Uuid,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: i32,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_type_parses_case_insensitively() {
        assert_eq!("Night".parse::<ShiftType>(), Ok(ShiftType::Night));
        assert_eq!(" early ".parse::<ShiftType>(), Ok(ShiftType::Early));
        assert_eq!(
            "graveyard".parse::<ShiftType>(),
            Err(ValidationError::UnknownShiftType("graveyard".to_string()))
        );
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
    }

    #[test]
    fn coverage_flags_understaffing() {
        let snapshot = CoverageSnapshot {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            shift_type: ShiftType::Late,
            current_staff: 2,
            after_swap_staff: 1,
            required_staff: 2,
        };
        assert!(snapshot.below_minimum());
    }

    #[test]
    fn full_name_handles_missing_last_name() {
        let profile = Profile {
            id: Uuid::new_v4(),
            first_name: "Avery".to_string(),
            last_name: String::new(),
            email: "avery@example.com".to_string(),
        };
        assert_eq!(profile.full_name(), "Avery");
    }
}
