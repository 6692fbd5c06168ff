//! Review lifecycle for shift-swap and vacation requests.
//!
//! Both request kinds start out `pending`. A reviewer approves or rejects,
//! the requester may cancel, and once a request has left `pending` it is
//! frozen.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::aggregate::is_weekend;
use crate::error::ValidationError;
use crate::models::{RequestStatus, ScheduleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
    Cancel,
}

impl Decision {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Cancel => "cancelled",
        }
    }
}

/// Next status for a request when `actor` applies `decision`.
///
/// Only the requester may cancel; approve and reject need a reviewer other
/// than the requester.
pub fn transition(
    current: RequestStatus,
    decision: Decision,
    requester_id: Uuid,
    actor: Option<Uuid>,
) -> Result<RequestStatus, ValidationError> {
    if current != RequestStatus::Pending {
        return Err(ValidationError::RequestNotPending(current.to_string()));
    }

    match (decision, actor) {
        (Decision::Cancel, Some(actor)) if actor == requester_id => Ok(RequestStatus::Cancelled),
        (Decision::Cancel, _) => Err(ValidationError::CancelNotByRequester),
        (_, None) => Err(ValidationError::MissingField("reviewer")),
        (_, Some(actor)) if actor == requester_id => Err(ValidationError::SelfReview),
        (Decision::Approve, Some(_)) => Ok(RequestStatus::Approved),
        (Decision::Reject, Some(_)) => Ok(RequestStatus::Rejected),
    }
}

fn ensure_member(members: &HashSet<Uuid>, user_id: Uuid, team_id: Uuid) -> Result<(), ValidationError> {
    if members.contains(&user_id) {
        Ok(())
    } else {
        Err(ValidationError::NotTeamMember { user_id, team_id })
    }
}

fn ensure_owner(entry: &ScheduleEntry, user_id: Uuid) -> Result<(), ValidationError> {
    if entry.user_id != user_id {
        return Err(ValidationError::EntryOwnerMismatch {
            entry_id: entry.id,
            user_id,
        });
    }
    if !entry.is_work() {
        return Err(ValidationError::NotAWorkShift(entry.id));
    }
    Ok(())
}

/// Checks a proposed swap and returns the team it belongs to.
///
/// `members` holds the user ids of the team both entries are on.
pub fn validate_swap(
    requester_id: Uuid,
    requester_entry: &ScheduleEntry,
    target_id: Uuid,
    target_entry: &ScheduleEntry,
    members: &HashSet<Uuid>,
) -> Result<Uuid, ValidationError> {
    if requester_id == target_id {
        return Err(ValidationError::SelfSwap);
    }
    if requester_entry.team_id != target_entry.team_id {
        return Err(ValidationError::TeamMismatch);
    }

    let team_id = requester_entry.team_id;
    ensure_owner(requester_entry, requester_id)?;
    ensure_owner(target_entry, target_id)?;
    ensure_member(members, requester_id, team_id)?;
    ensure_member(members, target_id, team_id)?;

    Ok(team_id)
}

/// Swapping across two dates must not leave either user with two entries
/// on one day. `team_entries` must cover both dates.
pub fn check_day_conflicts(
    requester_entry: &ScheduleEntry,
    target_entry: &ScheduleEntry,
    team_entries: &[ScheduleEntry],
) -> Result<(), ValidationError> {
    if requester_entry.date == target_entry.date {
        return Ok(());
    }

    let taken = |user_id: Uuid, date: NaiveDate| {
        team_entries.iter().any(|entry| {
            entry.team_id == requester_entry.team_id && entry.user_id == user_id && entry.date == date
        })
    };
    if taken(requester_entry.user_id, target_entry.date) {
        return Err(ValidationError::DayConflict {
            user_id: requester_entry.user_id,
            date: target_entry.date,
        });
    }
    if taken(target_entry.user_id, requester_entry.date) {
        return Err(ValidationError::DayConflict {
            user_id: target_entry.user_id,
            date: requester_entry.date,
        });
    }
    Ok(())
}

/// The two entries after an approved swap: same dates and shifts, owners exchanged.
pub fn swapped_entries(
    requester_entry: &ScheduleEntry,
    target_entry: &ScheduleEntry,
) -> (ScheduleEntry, ScheduleEntry) {
    let mut first = requester_entry.clone();
    let mut second = target_entry.clone();
    std::mem::swap(&mut first.user_id, &mut second.user_id);
    (first, second)
}

pub fn validate_vacation(
    user_id: Uuid,
    team_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    members: &HashSet<Uuid>,
) -> Result<(), ValidationError> {
    if start > end {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    ensure_member(members, user_id, team_id)
}

/// Working days a vacation consumes: weekdays in the range that are not holidays.
pub fn vacation_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !is_weekend(*day) && !holidays.contains(day))
        .collect()
}
