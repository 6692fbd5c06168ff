use std::collections::HashMap;
use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{FairnessScore, ImbalanceLevel, Profile, ScheduleRow};

#[derive(Serialize)]
struct ScheduleCsvRow<'a> {
    date: NaiveDate,
    name: &'a str,
    email: &'a str,
    team: &'a str,
    shift_type: &'static str,
    activity_type: &'static str,
    note: &'a str,
}

#[derive(Serialize)]
struct FairnessCsvRow<'a> {
    user_id: Uuid,
    name: &'a str,
    email: &'a str,
    past_weekend: u32,
    past_night: u32,
    past_holiday: u32,
    future_weekend: u32,
    future_night: u32,
    future_holiday: u32,
    total_weighted: f64,
    fairness_score: f64,
    imbalance_level: ImbalanceLevel,
}

fn two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn write_schedule<W: Write>(writer: W, rows: &[ScheduleRow]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(ScheduleCsvRow {
            date: row.entry.date,
            name: &row.user_name,
            email: &row.email,
            team: &row.team_name,
            shift_type: row.entry.shift_type.as_str(),
            activity_type: row.entry.activity_type.as_str(),
            note: row.entry.note.as_deref().unwrap_or(""),
        })?;
    }
    csv_writer.flush().context("failed to flush schedule export")?;
    Ok(())
}

/// One row per user; users missing from `profiles` are exported by id only.
pub fn write_fairness<W: Write>(
    writer: W,
    scores: &[FairnessScore],
    profiles: &HashMap<Uuid, Profile>,
) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for score in scores {
        let profile = profiles.get(&score.user_id);
        let name = profile.map(Profile::full_name).unwrap_or_default();
        csv_writer.serialize(FairnessCsvRow {
            user_id: score.user_id,
            name: &name,
            email: profile.map(|p| p.email.as_str()).unwrap_or(""),
            past_weekend: score.past_weekend,
            past_night: score.past_night,
            past_holiday: score.past_holiday,
            future_weekend: score.future_weekend,
            future_night: score.future_night,
            future_holiday: score.future_holiday,
            total_weighted: two_decimals(score.total_weighted),
            fairness_score: two_decimals(score.fairness_score),
            imbalance_level: score.imbalance_level,
        })?;
    }
    csv_writer.flush().context("failed to flush fairness export")?;
    Ok(())
}
