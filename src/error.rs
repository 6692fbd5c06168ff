use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

/// Rejections raised before anything is written.
///
/// Database and HTTP failures are not part of this enum; they travel as
/// `anyhow::Error` with call-site context.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("a team named '{0}' already exists")]
    DuplicateTeamName(String),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("unknown shift type '{0}'")]
    UnknownShiftType(String),
    #[error("unknown activity type '{0}'")]
    UnknownActivityType(String),
    #[error("unknown request status '{0}'")]
    UnknownStatus(String),
    #[error("request is already {0} and can no longer change")]
    RequestNotPending(String),
    #[error("only the requester can cancel a request")]
    CancelNotByRequester,
    #[error("requesters cannot approve or reject their own request")]
    SelfReview,
    #[error("a user cannot swap a shift with themselves")]
    SelfSwap,
    #[error("schedule entry {entry_id} does not belong to user {user_id}")]
    EntryOwnerMismatch { entry_id: Uuid, user_id: Uuid },
    #[error("schedule entry {0} is not a work shift")]
    NotAWorkShift(Uuid),
    #[error("schedule entries belong to different teams")]
    TeamMismatch,
    #[error("user {user_id} is already scheduled on {date}")]
    DayConflict { user_id: Uuid, date: NaiveDate },
    #[error("user {user_id} is not a member of team {team_id}")]
    NotTeamMember { user_id: Uuid, team_id: Uuid },
    #[error("date range {start} to {end} is inverted")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("end time {end} is not after start time {start}")]
    EndNotAfterStart { start: NaiveTime, end: NaiveTime },
    #[error("break of {0} minutes is negative")]
    NegativeBreak(i32),
    #[error("{0} could not be found")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ValidationError::DuplicateTeamName("Night Desk".to_string());
        assert_eq!(err.to_string(), "a team named 'Night Desk' already exists");

        let err = ValidationError::RequestNotPending("approved".to_string());
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = ValidationError::SelfSwap.into();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }
}
