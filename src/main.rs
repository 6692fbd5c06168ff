use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod aggregate;
mod config;
mod coverage;
mod db;
mod error;
mod export;
mod fairness;
mod flextime;
mod models;
mod notify;
mod report;
mod workflow;

use aggregate::DateWindow;
use config::Settings;
use models::{ActivityType, FlexTimeEntry, Profile, RequestStatus, ShiftType};
use notify::{Notification, Notifier, Recipient};
use workflow::Decision;

#[derive(Parser)]
#[command(name = "shift-planner")]
#[command(about = "Team shift planning: fairness analysis, swap and vacation reviews, FlexTime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo team with two weeks of shifts
    Seed,
    /// Import schedule entries for a team from a CSV file
    Import {
        #[arg(long)]
        team: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Manage teams and their members
    Team {
        #[command(subcommand)]
        action: TeamCommand,
    },
    /// Edit a single schedule entry
    Entry {
        #[command(subcommand)]
        action: EntryCommand,
    },
    /// Register a public holiday
    Holiday {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        name: String,
    },
    /// Score how evenly weekend, night and holiday shifts are spread
    Fairness {
        #[arg(long)]
        team: String,
        #[arg(long, default_value_t = 90)]
        past_days: i64,
        #[arg(long, default_value_t = 30)]
        future_days: i64,
        /// Write a markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write the scores as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Shift-swap requests
    Swap {
        #[command(subcommand)]
        action: SwapCommand,
    },
    /// Vacation requests
    Vacation {
        #[command(subcommand)]
        action: VacationCommand,
    },
    /// Flexible working hours
    Flex {
        #[command(subcommand)]
        action: FlexCommand,
    },
    /// Export a team's schedule as CSV
    Export {
        #[arg(long)]
        team: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Defaults to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Weekly duty-coverage digest
    Digest {
        #[arg(long)]
        team: String,
        /// Any day of the week to summarise; defaults to today
        #[arg(long)]
        week_of: Option<NaiveDate>,
        /// Email the digest to every team member
        #[arg(long)]
        send: bool,
    },
}

#[derive(Subcommand)]
enum TeamCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 2)]
        min_staff: i32,
    },
    AddMember {
        #[arg(long)]
        team: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    Members {
        #[arg(long)]
        team: String,
    },
}

#[derive(Subcommand)]
enum EntryCommand {
    Set {
        #[arg(long)]
        team: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "normal")]
        shift: ShiftType,
        #[arg(long, default_value = "work")]
        activity: ActivityType,
        #[arg(long)]
        note: Option<String>,
    },
    Clear {
        #[arg(long)]
        team: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
    Cancel,
}

impl From<DecisionArg> for Decision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Approve => Decision::Approve,
            DecisionArg::Reject => Decision::Reject,
            DecisionArg::Cancel => Decision::Cancel,
        }
    }
}

#[derive(Subcommand)]
enum SwapCommand {
    /// Ask another team member to trade shifts
    Request {
        #[arg(long)]
        team: String,
        #[arg(long)]
        requester: String,
        #[arg(long)]
        requester_date: NaiveDate,
        #[arg(long)]
        target: String,
        #[arg(long)]
        target_date: NaiveDate,
        #[arg(long)]
        reason: Option<String>,
    },
    /// List a team's swap requests
    List {
        #[arg(long)]
        team: String,
        #[arg(long)]
        status: Option<RequestStatus>,
    },
    /// Show the coverage impact of a pending swap
    Review {
        #[arg(long)]
        id: Uuid,
    },
    Decide {
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        /// Email of whoever decides: a reviewer, or the requester when cancelling
        #[arg(long, alias = "reviewer")]
        actor: Option<String>,
    },
}

#[derive(Subcommand)]
enum VacationCommand {
    Request {
        #[arg(long)]
        team: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        reason: Option<String>,
    },
    List {
        #[arg(long)]
        team: String,
        #[arg(long)]
        status: Option<RequestStatus>,
    },
    Decide {
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        /// Email of whoever decides: a reviewer, or the requester when cancelling
        #[arg(long, alias = "reviewer")]
        actor: Option<String>,
    },
}

#[derive(Subcommand)]
enum FlexCommand {
    /// Record worked hours for a day
    Record {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_clock_time)]
        start: NaiveTime,
        #[arg(long, value_parser = parse_clock_time)]
        end: NaiveTime,
        #[arg(long, default_value_t = 0)]
        break_minutes: u32,
        #[arg(long)]
        note: Option<String>,
    },
    /// Show the FlexTime balance over a period
    Balance {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        /// Print the full day-by-day breakdown as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_clock_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|err| format!("expected HH:MM, got '{value}': {err}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to connect to Postgres")?;

    if let Err(err) = run(cli.command, &settings, &pool).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

async fn run(command: Commands, settings: &Settings, pool: &PgPool) -> anyhow::Result<()> {
    let notifier = Notifier::new(settings)?;

    match command {
        Commands::InitDb => {
            db::init_db(pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { team, csv } => {
            let team = db::find_team(pool, &team).await?;
            let imported = db::import_csv(pool, team.id, &csv).await?;
            println!("Imported {imported} entries from {}.", csv.display());
        }
        Commands::Team { action } => run_team(action, pool).await?,
        Commands::Entry { action } => run_entry(action, pool, &notifier).await?,
        Commands::Holiday { date, name } => {
            let mut conn = pool.acquire().await?;
            db::add_holiday(&mut conn, date, &name).await?;
            println!("Holiday {name} on {date} saved.");
        }
        Commands::Fairness {
            team,
            past_days,
            future_days,
            report,
            csv,
        } => run_fairness(pool, &team, past_days, future_days, report, csv).await?,
        Commands::Swap { action } => run_swap(action, pool, &notifier).await?,
        Commands::Vacation { action } => run_vacation(action, pool, &notifier).await?,
        Commands::Flex { action } => run_flex(action, settings, pool).await?,
        Commands::Export { team, from, to, out } => {
            if from > to {
                return Err(error::ValidationError::InvalidDateRange { start: from, end: to }.into());
            }
            let team = db::find_team(pool, &team).await?;
            let rows = db::fetch_schedule_rows(pool, team.id, DateWindow { start: from, end: to }).await?;
            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    export::write_schedule(file, &rows)?;
                    println!("Exported {} entries to {}.", rows.len(), path.display());
                }
                None => export::write_schedule(std::io::stdout().lock(), &rows)?,
            }
        }
        Commands::Digest {
            team,
            week_of,
            send,
        } => {
            let team = db::find_team(pool, &team).await?;
            let monday = report::week_start(week_of.unwrap_or_else(aggregate::today));
            let window = DateWindow {
                start: monday,
                end: monday + Duration::days(6),
            };
            let entries = db::fetch_entries(pool, team.id, window).await?;
            let days = report::weekly_coverage(monday, &entries, required_staff(team.min_staff_per_shift));
            let summary = report::build_weekly_digest(&team.name, &days);
            print!("{summary}");

            if send {
                let members = db::fetch_members(pool, team.id).await?;
                let notification = Notification::WeeklyDigest {
                    to: members.iter().map(Recipient::from).collect(),
                    team_name: team.name.clone(),
                    week_start: monday,
                    summary,
                    days,
                };
                notifier.send(&notification).await?;
            }
        }
    }

    Ok(())
}

fn required_staff(min_staff_per_shift: i32) -> u32 {
    u32::try_from(min_staff_per_shift).unwrap_or(0)
}

async fn run_team(action: TeamCommand, pool: &PgPool) -> anyhow::Result<()> {
    match action {
        TeamCommand::Create { name, min_staff } => {
            let team = db::create_team(pool, &name, min_staff).await?;
            info!(team_id = %team.id, "team created");
            println!("Team {} created ({}).", team.name, team.id);
        }
        TeamCommand::AddMember {
            team,
            email,
            first_name,
            last_name,
        } => {
            let team = db::find_team(pool, &team).await?;
            let mut tx = pool.begin().await?;
            let user_id = db::upsert_profile(&mut tx, &email, &first_name, &last_name).await?;
            db::add_member(&mut tx, team.id, user_id).await?;
            tx.commit().await?;
            println!("{email} is now a member of {}.", team.name);
        }
        TeamCommand::Members { team } => {
            let team = db::find_team(pool, &team).await?;
            let members = db::fetch_members(pool, team.id).await?;
            if members.is_empty() {
                println!("{} has no members yet.", team.name);
            }
            for member in members {
                println!("- {} ({})", member.full_name(), member.email);
            }
        }
    }
    Ok(())
}

async fn run_entry(action: EntryCommand, pool: &PgPool, notifier: &Notifier) -> anyhow::Result<()> {
    match action {
        EntryCommand::Set {
            team,
            email,
            date,
            shift,
            activity,
            note,
        } => {
            let team = db::find_team(pool, &team).await?;
            let profile = db::find_profile(pool, &email).await?;
            let members = db::member_ids(pool, team.id).await?;
            if !members.contains(&profile.id) {
                return Err(error::ValidationError::NotTeamMember {
                    user_id: profile.id,
                    team_id: team.id,
                }
                .into());
            }

            let mut conn = pool.acquire().await?;
            let entry = db::upsert_entry(
                &mut conn,
                profile.id,
                team.id,
                date,
                shift,
                activity,
                note.as_deref(),
            )
            .await?;
            println!(
                "{} on {}: {} ({})",
                profile.full_name(),
                entry.date,
                entry.shift_type,
                entry.activity_type
            );

            let notification = Notification::ScheduleChange {
                to: Recipient::from(&profile),
                team_name: team.name,
                date: entry.date,
                shift_type: entry.shift_type,
                activity_type: entry.activity_type,
            };
            if let Err(err) = notifier.send(&notification).await {
                warn!("schedule saved but notification failed: {err:#}");
            }
        }
        EntryCommand::Clear { team, email, date } => {
            let team = db::find_team(pool, &team).await?;
            let profile = db::find_profile(pool, &email).await?;
            if db::delete_entry(pool, profile.id, team.id, date).await? {
                println!("Cleared {} on {}.", profile.full_name(), date);
            } else {
                println!("Nothing planned for {} on {}.", profile.full_name(), date);
            }
        }
    }
    Ok(())
}

async fn run_fairness(
    pool: &PgPool,
    team: &str,
    past_days: i64,
    future_days: i64,
    report_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let team = db::find_team(pool, team).await?;
    let today = aggregate::today();
    let window = aggregate::analysis_window(today, past_days, future_days);

    let members = db::fetch_members(pool, team.id).await?;
    if members.is_empty() {
        println!("{} has no members to analyse.", team.name);
        return Ok(());
    }

    let entries = db::fetch_entries(pool, team.id, window).await?;
    let holidays = db::fetch_holidays(pool, window).await?;
    let user_ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
    let histories = aggregate::count_shifts(&user_ids, team.id, window, &entries, &holidays, today);
    let mut scores = fairness::analyze(&histories);
    fairness::sort_by_burden(&mut scores);
    info!(members = scores.len(), entries = entries.len(), "fairness analysis complete");

    let profiles: HashMap<Uuid, Profile> = members.into_iter().map(|p| (p.id, p)).collect();

    println!("Shift burden for {} ({} to {}):", team.name, window.start, window.end);
    for score in scores.iter() {
        let name = profiles
            .get(&score.user_id)
            .map(Profile::full_name)
            .unwrap_or_default();
        println!(
            "- {} weighted {:.1}, fairness {:.0}, imbalance {}",
            name, score.total_weighted, score.fairness_score, score.imbalance_level
        );
    }

    if let Some(path) = report_path {
        let markdown = report::build_fairness_report(&team.name, window, &scores, &profiles);
        std::fs::write(&path, markdown)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Report written to {}.", path.display());
    }
    if let Some(path) = csv_path {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        export::write_fairness(file, &scores, &profiles)?;
        println!("Scores written to {}.", path.display());
    }
    Ok(())
}

async fn actor_id(pool: &PgPool, actor: Option<&str>) -> anyhow::Result<Option<Uuid>> {
    match actor {
        Some(email) => Ok(Some(db::find_profile(pool, email).await?.id)),
        None => Ok(None),
    }
}

async fn run_swap(action: SwapCommand, pool: &PgPool, notifier: &Notifier) -> anyhow::Result<()> {
    match action {
        SwapCommand::Request {
            team,
            requester,
            requester_date,
            target,
            target_date,
            reason,
        } => {
            let team = db::find_team(pool, &team).await?;
            let requester = db::find_profile(pool, &requester).await?;
            let target = db::find_profile(pool, &target).await?;
            let requester_entry = db::find_entry(pool, requester.id, team.id, requester_date).await?;
            let target_entry = db::find_entry(pool, target.id, team.id, target_date).await?;
            let members = db::member_ids(pool, team.id).await?;

            workflow::validate_swap(
                requester.id,
                &requester_entry,
                target.id,
                &target_entry,
                &members,
            )?;
            let both_days = swap_days(pool, team.id, &requester_entry, &target_entry).await?;
            workflow::check_day_conflicts(&requester_entry, &target_entry, &both_days)?;
            let request = db::create_swap_request(
                pool,
                team.id,
                &requester_entry,
                &target_entry,
                reason.as_deref(),
            )
            .await?;
            info!(request_id = %request.id, "swap requested");
            println!("Swap request {} is pending.", request.id);

            let notification = Notification::SwapRequested {
                to: Recipient::from(&target),
                requester_name: requester.full_name(),
                requester_date,
                requester_shift: requester_entry.shift_type,
                target_date,
                target_shift: target_entry.shift_type,
                reason,
            };
            if let Err(err) = notifier.send(&notification).await {
                warn!("swap stored but notification failed: {err:#}");
            }
        }
        SwapCommand::List { team, status } => {
            let team = db::find_team(pool, &team).await?;
            let requests = db::list_swap_requests(pool, team.id, status).await?;
            if requests.is_empty() {
                println!("No swap requests found.");
            }
            for request in requests {
                println!(
                    "- {} [{}] {} <-> {} (created {}){}",
                    request.id,
                    request.status,
                    request.requester_id,
                    request.target_id,
                    request.created_at.format("%Y-%m-%d %H:%M"),
                    request
                        .reason
                        .as_deref()
                        .map(|r| format!(": {r}"))
                        .unwrap_or_default()
                );
            }
        }
        SwapCommand::Review { id } => {
            let request = db::fetch_swap_request(pool, id).await?;
            let snapshots = swap_coverage(pool, &request).await?;
            println!("Swap {} is {}.", request.id, request.status);
            if let (Some(by), Some(at)) = (request.reviewed_by, request.reviewed_at) {
                println!("Reviewed by {} at {}.", by, at.format("%Y-%m-%d %H:%M"));
            }
            for snapshot in snapshots.iter() {
                println!(
                    "- {} {}: {} now, {} after swap (minimum {}){}",
                    snapshot.date,
                    snapshot.shift_type,
                    snapshot.current_staff,
                    snapshot.after_swap_staff,
                    snapshot.required_staff,
                    if snapshot.below_minimum() { " UNDERSTAFFED" } else { "" }
                );
            }
        }
        SwapCommand::Decide {
            id,
            decision,
            actor,
        } => {
            let decision = Decision::from(decision);
            let request = db::fetch_swap_request(pool, id).await?;
            let actor_id = actor_id(pool, actor.as_deref()).await?;
            let status = workflow::transition(request.status, decision, request.requester_id, actor_id)?;

            let requester_entry = db::fetch_entry(pool, request.requester_entry_id).await?;
            let target_entry = db::fetch_entry(pool, request.target_entry_id).await?;
            let snapshots = swap_coverage(pool, &request).await?;

            if status == RequestStatus::Approved {
                let members = db::member_ids(pool, request.team_id).await?;
                workflow::validate_swap(
                    request.requester_id,
                    &requester_entry,
                    request.target_id,
                    &target_entry,
                    &members,
                )?;
                let both_days =
                    swap_days(pool, request.team_id, &requester_entry, &target_entry).await?;
                workflow::check_day_conflicts(&requester_entry, &target_entry, &both_days)?;
                if coverage::has_coverage_warning(&snapshots) {
                    warn!(request_id = %request.id, "approving swap that leaves a shift below minimum staffing");
                }
                let (first, second) = workflow::swapped_entries(&requester_entry, &target_entry);
                db::apply_swap_decision(pool, &request, status, actor_id, Some((&first, &second)))
                    .await?;
            } else {
                db::apply_swap_decision(pool, &request, status, actor_id, None).await?;
            }
            info!(request_id = %request.id, status = %status, "swap {}", decision.verb());
            println!("Swap {} {}.", request.id, decision.verb());

            let members = db::fetch_members(pool, request.team_id).await?;
            let recipients: Vec<Recipient> = members
                .iter()
                .filter(|p| p.id == request.requester_id || p.id == request.target_id)
                .map(Recipient::from)
                .collect();
            let notification = Notification::SwapDecision {
                to: recipients,
                status,
                requester_date: requester_entry.date,
                target_date: target_entry.date,
                coverage: snapshots,
            };
            if let Err(err) = notifier.send(&notification).await {
                warn!("decision stored but notification failed: {err:#}");
            }
        }
    }
    Ok(())
}

/// Team entries on the days of both swapped entries.
async fn swap_days(
    pool: &PgPool,
    team_id: Uuid,
    requester_entry: &models::ScheduleEntry,
    target_entry: &models::ScheduleEntry,
) -> anyhow::Result<Vec<models::ScheduleEntry>> {
    let window = DateWindow {
        start: requester_entry.date.min(target_entry.date),
        end: requester_entry.date.max(target_entry.date),
    };
    Ok(db::fetch_entries(pool, team_id, window)
        .await?
        .into_iter()
        .filter(|entry| entry.date == requester_entry.date || entry.date == target_entry.date)
        .collect())
}

/// Coverage on the requester's day, the shift the requester gives away.
async fn swap_coverage(
    pool: &PgPool,
    request: &models::SwapRequest,
) -> anyhow::Result<Vec<models::CoverageSnapshot>> {
    let team = db::fetch_team(pool, request.team_id).await?;
    let requester_entry = db::fetch_entry(pool, request.requester_entry_id).await?;
    let target_entry = db::fetch_entry(pool, request.target_entry_id).await?;
    let day = DateWindow {
        start: requester_entry.date,
        end: requester_entry.date,
    };
    let entries = db::fetch_entries(pool, team.id, day).await?;

    Ok(coverage::estimate_swap_impact(
        requester_entry.date,
        &entries,
        requester_entry.shift_type,
        target_entry.shift_type,
        required_staff(team.min_staff_per_shift),
    ))
}

async fn run_vacation(action: VacationCommand, pool: &PgPool, notifier: &Notifier) -> anyhow::Result<()> {
    match action {
        VacationCommand::Request {
            team,
            email,
            start,
            end,
            reason,
        } => {
            let team = db::find_team(pool, &team).await?;
            let profile = db::find_profile(pool, &email).await?;
            let members = db::member_ids(pool, team.id).await?;
            workflow::validate_vacation(profile.id, team.id, start, end, &members)?;

            let request =
                db::create_vacation_request(pool, team.id, profile.id, start, end, reason.as_deref())
                    .await?;
            info!(request_id = %request.id, "vacation requested");
            println!("Vacation request {} is pending.", request.id);
        }
        VacationCommand::List { team, status } => {
            let team = db::find_team(pool, &team).await?;
            let requests = db::list_vacation_requests(pool, team.id, status).await?;
            if requests.is_empty() {
                println!("No vacation requests found.");
            }
            for request in requests {
                let reviewed = match (request.reviewed_by, request.reviewed_at) {
                    (Some(by), Some(at)) => format!(", reviewed by {} on {}", by, at.date_naive()),
                    _ => String::new(),
                };
                println!(
                    "- {} [{}] {} from {} to {} (created {}{})",
                    request.id,
                    request.status,
                    request.user_id,
                    request.start_date,
                    request.end_date,
                    request.created_at.date_naive(),
                    reviewed
                );
            }
        }
        VacationCommand::Decide {
            id,
            decision,
            actor,
        } => {
            let decision = Decision::from(decision);
            let request = db::fetch_vacation_request(pool, id).await?;
            let actor_id = actor_id(pool, actor.as_deref()).await?;
            let status = workflow::transition(request.status, decision, request.user_id, actor_id)?;

            let range = DateWindow {
                start: request.start_date,
                end: request.end_date,
            };
            let holidays = db::fetch_holidays(pool, range).await?;
            let days = workflow::vacation_days(request.start_date, request.end_date, &holidays);
            db::apply_vacation_decision(pool, &request, status, actor_id, &days).await?;
            info!(request_id = %request.id, status = %status, days = days.len(), "vacation {}", decision.verb());
            println!("Vacation {} {}.", request.id, decision.verb());

            let members = db::fetch_members(pool, request.team_id).await?;
            if let Some(profile) = members.iter().find(|p| p.id == request.user_id) {
                let notification = Notification::VacationDecision {
                    to: Recipient::from(profile),
                    status,
                    start_date: request.start_date,
                    end_date: request.end_date,
                };
                if let Err(err) = notifier.send(&notification).await {
                    warn!("decision stored but notification failed: {err:#}");
                }
            }
        }
    }
    Ok(())
}

async fn run_flex(action: FlexCommand, settings: &Settings, pool: &PgPool) -> anyhow::Result<()> {
    match action {
        FlexCommand::Record {
            email,
            date,
            start,
            end,
            break_minutes,
            note,
        } => {
            let profile = db::find_profile(pool, &email).await?;
            let entry = FlexTimeEntry {
                user_id: profile.id,
                work_date: date,
                start_time: start,
                end_time: end,
                break_minutes: i32::try_from(break_minutes).context("break minutes out of range")?,
                note,
            };
            flextime::validate_entry(&entry)?;
            let holidays = db::fetch_holidays(pool, DateWindow { start: date, end: date }).await?;
            let day = flextime::evaluate_day(&entry, settings.daily_target_hours, &holidays);
            for violation in day.violations.iter() {
                warn!(?violation, %date, "working time rule broken");
            }

            db::record_flextime(pool, &entry).await?;
            println!(
                "{} on {}: {:.2}h worked, balance {:+.2}h",
                profile.full_name(),
                date,
                day.actual_hours,
                day.balance
            );
        }
        FlexCommand::Balance {
            email,
            since_days,
            json,
        } => {
            let profile = db::find_profile(pool, &email).await?;
            let window = aggregate::analysis_window(aggregate::today(), since_days, 0);
            let entries = db::fetch_flextime(pool, profile.id, window).await?;
            let holidays = db::fetch_holidays(pool, window).await?;
            let summary = flextime::summarize(profile.id, &entries, settings.daily_target_hours, &holidays);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} since {}: {:.2}h of {:.2}h target, balance {:+.2}h across {} day(s), {} rule violation(s)",
                    profile.full_name(),
                    window.start,
                    summary.total_actual_hours,
                    summary.total_target_hours,
                    summary.balance,
                    summary.days.len(),
                    summary.violation_count()
                );
            }
        }
    }
    Ok(())
}
