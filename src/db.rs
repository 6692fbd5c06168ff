use std::collections::HashSet;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::DateWindow;
use crate::error::ValidationError;
use crate::models::{
    ActivityType, FlexTimeEntry, Profile, RequestStatus, ScheduleEntry, ScheduleRow, ShiftType,
    SwapRequest, Team, VacationRequest,
};

const ENTRY_COLUMNS: &str = "e.id, e.user_id, e.team_id, e.date, e.shift_type, e.activity_type, e.note";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn entry_from_row(row: &PgRow) -> anyhow::Result<ScheduleEntry> {
    let shift_type: String = row.try_get("shift_type")?;
    let activity_type: String = row.try_get("activity_type")?;
    Ok(ScheduleEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        team_id: row.try_get("team_id")?,
        date: row.try_get("date")?,
        shift_type: shift_type.parse()?,
        activity_type: activity_type.parse()?,
        note: row.try_get("note")?,
    })
}

fn profile_from_row(row: &PgRow) -> anyhow::Result<Profile> {
    Ok(Profile {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
    })
}

fn team_from_row(row: &PgRow) -> anyhow::Result<Team> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        min_staff_per_shift: row.try_get("min_staff_per_shift")?,
    })
}

fn swap_from_row(row: &PgRow) -> anyhow::Result<SwapRequest> {
    let status: String = row.try_get("status")?;
    Ok(SwapRequest {
        id: row.try_get("id")?,
        team_id: row.try_get("team_id")?,
        requester_id: row.try_get("requester_id")?,
        requester_entry_id: row.try_get("requester_entry_id")?,
        target_id: row.try_get("target_id")?,
        target_entry_id: row.try_get("target_entry_id")?,
        status: status.parse()?,
        reason: row.try_get("reason")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn vacation_from_row(row: &PgRow) -> anyhow::Result<VacationRequest> {
    let status: String = row.try_get("status")?;
    Ok(VacationRequest {
        id: row.try_get("id")?,
        team_id: row.try_get("team_id")?,
        user_id: row.try_get("user_id")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status: status.parse()?,
        reason: row.try_get("reason")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let team = match find_team(pool, "Dispatch").await {
        Ok(team) => team,
        Err(err) if err.downcast_ref::<ValidationError>().is_some() => {
            create_team(pool, "Dispatch", 1).await?
        }
        Err(err) => return Err(err),
    };

    let people = [
        ("Avery", "Lee", "avery.lee@example.com"),
        ("Jules", "Moreno", "jules.moreno@example.com"),
        ("Kiara", "Patel", "kiara.patel@example.com"),
        ("Noah", "Becker", "noah.becker@example.com"),
    ];

    let mut tx = pool.begin().await?;
    let mut user_ids = Vec::new();
    for (first_name, last_name, email) in people {
        let user_id = upsert_profile(&mut tx, email, first_name, last_name).await?;
        add_member(&mut tx, team.id, user_id).await?;
        user_ids.push(user_id);
    }

    let holidays = [
        (NaiveDate::from_ymd_opt(2026, 1, 1).context("invalid date")?, "New Year's Day"),
        (NaiveDate::from_ymd_opt(2026, 4, 3).context("invalid date")?, "Good Friday"),
        (NaiveDate::from_ymd_opt(2026, 5, 1).context("invalid date")?, "Labour Day"),
        (NaiveDate::from_ymd_opt(2026, 12, 25).context("invalid date")?, "Christmas Day"),
    ];
    for (date, name) in holidays {
        add_holiday(&mut tx, date, name).await?;
    }

    // two weeks of rotating early/late/night cover starting on a Monday
    let start = NaiveDate::from_ymd_opt(2026, 3, 30).context("invalid date")?;
    let rotation = [ShiftType::Early, ShiftType::Late, ShiftType::Night, ShiftType::Normal];
    for (offset, date) in start.iter_days().take(14).enumerate() {
        for (index, user_id) in user_ids.iter().enumerate() {
            let shift_type = rotation[(offset + index) % rotation.len()];
            upsert_entry(&mut tx, *user_id, team.id, date, shift_type, ActivityType::Work, None)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn create_team(pool: &PgPool, name: &str, min_staff: i32) -> anyhow::Result<Team> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO shift_planner.teams (id, name, min_staff_per_shift)
        VALUES ($1, $2, $3)
        RETURNING id, name, min_staff_per_shift
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(min_staff)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => team_from_row(&row),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(ValidationError::DuplicateTeamName(name.to_string()).into())
        }
        Err(err) => Err(err).context("failed to create team"),
    }
}

pub async fn find_team(pool: &PgPool, name: &str) -> anyhow::Result<Team> {
    let row = sqlx::query(
        "SELECT id, name, min_staff_per_shift FROM shift_planner.teams WHERE name = $1",
    )
    .bind(name.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ValidationError::NotFound(format!("team '{name}'")))?;
    team_from_row(&row)
}

pub async fn fetch_team(pool: &PgPool, team_id: Uuid) -> anyhow::Result<Team> {
    let row = sqlx::query(
        "SELECT id, name, min_staff_per_shift FROM shift_planner.teams WHERE id = $1",
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ValidationError::NotFound(format!("team {team_id}")))?;
    team_from_row(&row)
}

pub async fn upsert_profile(
    conn: &mut PgConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<Uuid> {
    let email = email.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email").into());
    }
    if first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("first_name").into());
    }

    let id = sqlx::query(
        r#"
        INSERT INTO shift_planner.profiles (id, first_name, last_name, email)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(&email)
    .fetch_one(&mut *conn)
    .await?
    .try_get("id")?;
    Ok(id)
}

pub async fn find_profile(pool: &PgPool, email: &str) -> anyhow::Result<Profile> {
    let email = email.trim().to_ascii_lowercase();
    let row = sqlx::query(
        "SELECT id, first_name, last_name, email FROM shift_planner.profiles WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ValidationError::NotFound(format!("profile '{email}'")))?;
    profile_from_row(&row)
}

pub async fn add_member(conn: &mut PgConnection, team_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shift_planner.team_members (team_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (team_id, user_id) DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn fetch_members(pool: &PgPool, team_id: Uuid) -> anyhow::Result<Vec<Profile>> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.first_name, p.last_name, p.email
        FROM shift_planner.team_members m
        JOIN shift_planner.profiles p ON p.id = m.user_id
        WHERE m.team_id = $1
        ORDER BY p.last_name, p.first_name
        "#,
    )
    .bind(team_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(profile_from_row).collect()
}

pub async fn member_ids(pool: &PgPool, team_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
    let rows = sqlx::query("SELECT user_id FROM shift_planner.team_members WHERE team_id = $1")
        .bind(team_id)
        .fetch_all(pool)
        .await?;

    let mut ids = HashSet::new();
    for row in rows {
        ids.insert(row.try_get("user_id")?);
    }
    Ok(ids)
}

pub async fn add_holiday(conn: &mut PgConnection, date: NaiveDate, name: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shift_planner.holidays (date, name)
        VALUES ($1, $2)
        ON CONFLICT (date) DO UPDATE SET name = EXCLUDED.name
        "#,
    )
    .bind(date)
    .bind(name)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn fetch_holidays(pool: &PgPool, window: DateWindow) -> anyhow::Result<HashSet<NaiveDate>> {
    let rows = sqlx::query(
        "SELECT date FROM shift_planner.holidays WHERE date BETWEEN $1 AND $2",
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;

    let mut dates = HashSet::new();
    for row in rows {
        dates.insert(row.try_get("date")?);
    }
    Ok(dates)
}

/// Sets the entry for a user's day, replacing whatever was planned before.
///
/// Update-then-insert rather than `ON CONFLICT`: the per-day uniqueness
/// constraint is deferred, which `ON CONFLICT` cannot target.
pub async fn upsert_entry(
    conn: &mut PgConnection,
    user_id: Uuid,
    team_id: Uuid,
    date: NaiveDate,
    shift_type: ShiftType,
    activity_type: ActivityType,
    note: Option<&str>,
) -> anyhow::Result<ScheduleEntry> {
    let updated = sqlx::query(
        r#"
        UPDATE shift_planner.schedule_entries e
        SET shift_type = $4, activity_type = $5, note = $6, updated_at = NOW()
        WHERE e.user_id = $1 AND e.team_id = $2 AND e.date = $3
        RETURNING e.id, e.user_id, e.team_id, e.date, e.shift_type, e.activity_type, e.note
        "#,
    )
    .bind(user_id)
    .bind(team_id)
    .bind(date)
    .bind(shift_type.as_str())
    .bind(activity_type.as_str())
    .bind(note)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = updated {
        return entry_from_row(&row);
    }

    let row = sqlx::query(
        r#"
        INSERT INTO shift_planner.schedule_entries AS e
        (id, user_id, team_id, date, shift_type, activity_type, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING e.id, e.user_id, e.team_id, e.date, e.shift_type, e.activity_type, e.note
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(team_id)
    .bind(date)
    .bind(shift_type.as_str())
    .bind(activity_type.as_str())
    .bind(note)
    .fetch_one(&mut *conn)
    .await?;
    entry_from_row(&row)
}

pub async fn delete_entry(
    pool: &PgPool,
    user_id: Uuid,
    team_id: Uuid,
    date: NaiveDate,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "DELETE FROM shift_planner.schedule_entries WHERE user_id = $1 AND team_id = $2 AND date = $3",
    )
    .bind(user_id)
    .bind(team_id)
    .bind(date)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_entry(pool: &PgPool, entry_id: Uuid) -> anyhow::Result<ScheduleEntry> {
    let query = format!("SELECT {ENTRY_COLUMNS} FROM shift_planner.schedule_entries e WHERE e.id = $1");
    let row = sqlx::query(&query)
        .bind(entry_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ValidationError::NotFound(format!("schedule entry {entry_id}")))?;
    entry_from_row(&row)
}

pub async fn find_entry(
    pool: &PgPool,
    user_id: Uuid,
    team_id: Uuid,
    date: NaiveDate,
) -> anyhow::Result<ScheduleEntry> {
    let query = format!(
        "SELECT {ENTRY_COLUMNS} FROM shift_planner.schedule_entries e \
         WHERE e.user_id = $1 AND e.team_id = $2 AND e.date = $3"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(team_id)
        .bind(date)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ValidationError::NotFound(format!("schedule entry on {date}")))?;
    entry_from_row(&row)
}

pub async fn fetch_entries(
    pool: &PgPool,
    team_id: Uuid,
    window: DateWindow,
) -> anyhow::Result<Vec<ScheduleEntry>> {
    let query = format!(
        "SELECT {ENTRY_COLUMNS} FROM shift_planner.schedule_entries e \
         WHERE e.team_id = $1 AND e.date BETWEEN $2 AND $3 \
         ORDER BY e.date"
    );
    let rows = sqlx::query(&query)
        .bind(team_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(pool)
        .await?;

    debug!(rows = rows.len(), %team_id, "fetched schedule entries");
    rows.iter().map(entry_from_row).collect()
}

pub async fn fetch_schedule_rows(
    pool: &PgPool,
    team_id: Uuid,
    window: DateWindow,
) -> anyhow::Result<Vec<ScheduleRow>> {
    let query = format!(
        "SELECT {ENTRY_COLUMNS}, p.first_name, p.last_name, p.email, t.name AS team_name \
         FROM shift_planner.schedule_entries e \
         JOIN shift_planner.profiles p ON p.id = e.user_id \
         JOIN shift_planner.teams t ON t.id = e.team_id \
         WHERE e.team_id = $1 AND e.date BETWEEN $2 AND $3 \
         ORDER BY e.date, p.last_name, p.first_name"
    );
    let rows = sqlx::query(&query)
        .bind(team_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(pool)
        .await?;

    let mut schedule = Vec::with_capacity(rows.len());
    for row in rows {
        let first_name: String = row.try_get("first_name")?;
        let last_name: String = row.try_get("last_name")?;
        schedule.push(ScheduleRow {
            entry: entry_from_row(&row)?,
            user_name: format!("{first_name} {last_name}").trim().to_string(),
            email: row.try_get("email")?,
            team_name: row.try_get("team_name")?,
        });
    }
    Ok(schedule)
}

/// Loads schedule entries for a team from CSV, creating profiles and
/// memberships as needed. The whole file is written in one transaction.
pub async fn import_csv(pool: &PgPool, team_id: Uuid, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        email: String,
        first_name: String,
        #[serde(default)]
        last_name: String,
        date: NaiveDate,
        shift_type: String,
        #[serde(default)]
        activity_type: Option<String>,
        #[serde(default)]
        note: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut tx = pool.begin().await?;
    let mut imported = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV record {}", index + 1))?;
        let shift_type: ShiftType = row.shift_type.parse()?;
        let activity_type = match row.activity_type.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value.parse()?,
            _ => ActivityType::Work,
        };

        let user_id = upsert_profile(&mut tx, &row.email, &row.first_name, &row.last_name).await?;
        add_member(&mut tx, team_id, user_id).await?;
        upsert_entry(
            &mut tx,
            user_id,
            team_id,
            row.date,
            shift_type,
            activity_type,
            row.note.as_deref().filter(|n| !n.trim().is_empty()),
        )
        .await?;
        imported += 1;
    }

    tx.commit().await?;
    info!(imported, %team_id, "imported schedule entries");
    Ok(imported)
}

pub async fn create_swap_request(
    pool: &PgPool,
    team_id: Uuid,
    requester_entry: &ScheduleEntry,
    target_entry: &ScheduleEntry,
    reason: Option<&str>,
) -> anyhow::Result<SwapRequest> {
    let row = sqlx::query(
        r#"
        INSERT INTO shift_planner.shift_swap_requests
        (id, team_id, requester_id, requester_entry_id, target_id, target_entry_id, status, reason)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(team_id)
    .bind(requester_entry.user_id)
    .bind(requester_entry.id)
    .bind(target_entry.user_id)
    .bind(target_entry.id)
    .bind(RequestStatus::Pending.as_str())
    .bind(reason)
    .fetch_one(pool)
    .await?;
    swap_from_row(&row)
}

pub async fn fetch_swap_request(pool: &PgPool, request_id: Uuid) -> anyhow::Result<SwapRequest> {
    let row = sqlx::query("SELECT * FROM shift_planner.shift_swap_requests WHERE id = $1")
        .bind(request_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ValidationError::NotFound(format!("swap request {request_id}")))?;
    swap_from_row(&row)
}

pub async fn list_swap_requests(
    pool: &PgPool,
    team_id: Uuid,
    status: Option<RequestStatus>,
) -> anyhow::Result<Vec<SwapRequest>> {
    let mut query = String::from("SELECT * FROM shift_planner.shift_swap_requests WHERE team_id = $1");
    if status.is_some() {
        query.push_str(" AND status = $2");
    }
    query.push_str(" ORDER BY created_at");

    let mut rows = sqlx::query(&query).bind(team_id);
    if let Some(value) = status {
        rows = rows.bind(value.as_str());
    }

    let records = rows.fetch_all(pool).await?;
    records.iter().map(swap_from_row).collect()
}

/// Moves a request out of `pending`, guarded so a concurrent review cannot
/// decide it twice.
async fn mark_reviewed(
    conn: &mut PgConnection,
    table: &str,
    request_id: Uuid,
    status: RequestStatus,
    reviewer_id: Option<Uuid>,
) -> anyhow::Result<()> {
    let query = format!(
        "UPDATE shift_planner.{table} \
         SET status = $2, reviewed_by = $3, reviewed_at = $4 \
         WHERE id = $1 AND status = 'pending'"
    );
    let result = sqlx::query(&query)
        .bind(request_id)
        .bind(status.as_str())
        .bind(reviewer_id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        let current: Option<String> = sqlx::query_scalar(&format!(
            "SELECT status FROM shift_planner.{table} WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?;
        return Err(stale_review(request_id, current.as_deref()).into());
    }
    Ok(())
}

/// Why a guarded review update matched no row: the request is gone or
/// another review moved it first.
fn stale_review(request_id: Uuid, current: Option<&str>) -> ValidationError {
    match current {
        Some(status) => ValidationError::RequestNotPending(status.to_string()),
        None => ValidationError::NotFound(format!("request {request_id}")),
    }
}

/// Records the decision and, for approvals, hands each entry to the other user.
pub async fn apply_swap_decision(
    pool: &PgPool,
    request: &SwapRequest,
    status: RequestStatus,
    reviewer_id: Option<Uuid>,
    swapped: Option<(&ScheduleEntry, &ScheduleEntry)>,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    mark_reviewed(&mut tx, "shift_swap_requests", request.id, status, reviewer_id).await?;

    if let Some(entries) = swapped {
        for entry in [entries.0, entries.1] {
            sqlx::query(
                "UPDATE shift_planner.schedule_entries SET user_id = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(entry.id)
            .bind(entry.user_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit()
        .await
        .context("failed to commit swap decision")?;
    Ok(())
}

pub async fn create_vacation_request(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<&str>,
) -> anyhow::Result<VacationRequest> {
    let row = sqlx::query(
        r#"
        INSERT INTO shift_planner.vacation_requests
        (id, team_id, user_id, start_date, end_date, status, reason)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(team_id)
    .bind(user_id)
    .bind(start_date)
    .bind(end_date)
    .bind(RequestStatus::Pending.as_str())
    .bind(reason)
    .fetch_one(pool)
    .await?;
    vacation_from_row(&row)
}

pub async fn fetch_vacation_request(pool: &PgPool, request_id: Uuid) -> anyhow::Result<VacationRequest> {
    let row = sqlx::query("SELECT * FROM shift_planner.vacation_requests WHERE id = $1")
        .bind(request_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ValidationError::NotFound(format!("vacation request {request_id}")))?;
    vacation_from_row(&row)
}

pub async fn list_vacation_requests(
    pool: &PgPool,
    team_id: Uuid,
    status: Option<RequestStatus>,
) -> anyhow::Result<Vec<VacationRequest>> {
    let mut query = String::from("SELECT * FROM shift_planner.vacation_requests WHERE team_id = $1");
    if status.is_some() {
        query.push_str(" AND status = $2");
    }
    query.push_str(" ORDER BY start_date");

    let mut rows = sqlx::query(&query).bind(team_id);
    if let Some(value) = status {
        rows = rows.bind(value.as_str());
    }

    let records = rows.fetch_all(pool).await?;
    records.iter().map(vacation_from_row).collect()
}

/// Records the decision and, for approvals, books the given days as vacation.
pub async fn apply_vacation_decision(
    pool: &PgPool,
    request: &VacationRequest,
    status: RequestStatus,
    reviewer_id: Option<Uuid>,
    days: &[NaiveDate],
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    mark_reviewed(&mut tx, "vacation_requests", request.id, status, reviewer_id).await?;

    if status == RequestStatus::Approved {
        for day in days {
            upsert_entry(
                &mut tx,
                request.user_id,
                request.team_id,
                *day,
                ShiftType::Normal,
                ActivityType::Vacation,
                request.reason.as_deref(),
            )
            .await?;
        }
    }

    tx.commit()
        .await
        .context("failed to commit vacation decision")?;
    Ok(())
}

pub async fn record_flextime(pool: &PgPool, entry: &FlexTimeEntry) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shift_planner.flextime_entries
        (id, user_id, work_date, start_time, end_time, break_minutes, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id, work_date) DO UPDATE
        SET start_time = EXCLUDED.start_time,
            end_time = EXCLUDED.end_time,
            break_minutes = EXCLUDED.break_minutes,
            note = EXCLUDED.note
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.user_id)
    .bind(entry.work_date)
    .bind(entry.start_time)
    .bind(entry.end_time)
    .bind(entry.break_minutes)
    .bind(entry.note.as_deref())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch_flextime(
    pool: &PgPool,
    user_id: Uuid,
    window: DateWindow,
) -> anyhow::Result<Vec<FlexTimeEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, work_date, start_time, end_time, break_minutes, note
        FROM shift_planner.flextime_entries
        WHERE user_id = $1 AND work_date BETWEEN $2 AND $3
        ORDER BY work_date
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let start_time: NaiveTime = row.try_get("start_time")?;
        let end_time: NaiveTime = row.try_get("end_time")?;
        entries.push(FlexTimeEntry {
            user_id: row.try_get("user_id")?,
            work_date: row.try_get("work_date")?,
            start_time,
            end_time,
            break_minutes: row.try_get("break_minutes")?,
            note: row.try_get("note")?,
        });
    }
    Ok(entries)
}
