use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::models::{ActivityType, CoverageSnapshot, Profile, RequestStatus, ShiftType};
use crate::report::DigestDay;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl From<&Profile> for Recipient {
    fn from(profile: &Profile) -> Self {
        Self {
            email: profile.email.clone(),
            name: profile.full_name(),
        }
    }
}

/// JSON bodies accepted by the email functions.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ScheduleChange {
        to: Recipient,
        team_name: String,
        date: NaiveDate,
        shift_type: ShiftType,
        activity_type: ActivityType,
    },
    SwapRequested {
        to: Recipient,
        requester_name: String,
        requester_date: NaiveDate,
        requester_shift: ShiftType,
        target_date: NaiveDate,
        target_shift: ShiftType,
        reason: Option<String>,
    },
    SwapDecision {
        to: Vec<Recipient>,
        status: RequestStatus,
        requester_date: NaiveDate,
        target_date: NaiveDate,
        coverage: Vec<CoverageSnapshot>,
    },
    VacationDecision {
        to: Recipient,
        status: RequestStatus,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    WeeklyDigest {
        to: Vec<Recipient>,
        team_name: String,
        week_start: NaiveDate,
        summary: String,
        days: Vec<DigestDay>,
    },
}

impl Notification {
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::ScheduleChange { .. } => "send-schedule-change",
            Self::SwapRequested { .. } | Self::SwapDecision { .. } => "send-swap-notification",
            Self::VacationDecision { .. } => "send-vacation-notification",
            Self::WeeklyDigest { .. } => "send-weekly-digest",
        }
    }
}

pub struct Notifier {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl Notifier {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build HTTP client for notifications")?;

        Ok(Self {
            client,
            base_url: settings.notify_functions_url.clone(),
            api_key: settings.notify_api_key.clone(),
        })
    }

    pub fn endpoint(&self, notification: &Notification) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/{}", base, notification.function_name()))
    }

    /// Posts the notification once. Returns `false` when no functions URL is
    /// configured and the message was only logged.
    pub async fn send(&self, notification: &Notification) -> anyhow::Result<bool> {
        let Some(url) = self.endpoint(notification) else {
            let body = serde_json::to_string(notification)?;
            info!(
                function = notification.function_name(),
                %body,
                "notifications disabled, skipping email"
            );
            return Ok(false);
        };

        let mut request = self.client.post(&url).json(notification);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach email function {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            warn!(%url, %status, "email function rejected notification");
            anyhow::bail!("email function {} failed ({}): {}", url, status, body.trim());
        }

        info!(function = notification.function_name(), "notification sent");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: Option<&str>) -> Settings {
        Settings {
            database_url: "postgres://localhost/shifts".to_string(),
            max_connections: 1,
            notify_functions_url: url.map(str::to_string),
            notify_api_key: None,
            daily_target_hours: 8.0,
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            email: "avery@example.com".to_string(),
            name: "Avery Lee".to_string(),
        }
    }

    fn change() -> Notification {
        Notification::ScheduleChange {
            to: recipient(),
            team_name: "Dispatch".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            shift_type: ShiftType::Early,
            activity_type: ActivityType::Work,
        }
    }

    #[test]
    fn body_is_tagged_json() {
        let value = serde_json::to_value(change()).unwrap();
        assert_eq!(value["type"], "schedule_change");
        assert_eq!(value["to"]["email"], "avery@example.com");
        assert_eq!(value["date"], "2026-03-09");
        assert_eq!(value["shift_type"], "early");
    }

    #[test]
    fn swap_messages_share_one_function() {
        let decision = Notification::SwapDecision {
            to: vec![recipient()],
            status: RequestStatus::Approved,
            requester_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            target_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            coverage: Vec::new(),
        };
        assert_eq!(decision.function_name(), "send-swap-notification");
        assert_eq!(change().function_name(), "send-schedule-change");
    }

    #[test]
    fn endpoint_joins_base_and_function() {
        let notifier = Notifier::new(&settings(Some("https://functions.example.com/v1"))).unwrap();
        assert_eq!(
            notifier.endpoint(&change()).as_deref(),
            Some("https://functions.example.com/v1/send-schedule-change")
        );
    }

    #[tokio::test]
    async fn skips_sending_without_a_url() {
        let notifier = Notifier::new(&settings(None)).unwrap();
        assert!(!notifier.send(&change()).await.unwrap());
    }
}
