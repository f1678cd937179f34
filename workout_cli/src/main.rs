use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use workout_core::history::last_performance;
use workout_core::stats::fetch_snapshot;
use workout_core::*;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Workout session logger with rest timer and training stats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Trainee to log for (defaults to trainee.id from config)
    #[arg(long, global = true)]
    trainee: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in workout plans
    Plans,

    /// Run a workout session, reading commands from stdin
    Run {
        /// Built-in plan name
        #[arg(long, conflicts_with = "plan_file")]
        plan: Option<String>,

        /// Load the plan from a TOML file
        #[arg(long)]
        plan_file: Option<PathBuf>,
    },

    /// Show streak, volume and consistency (default)
    Stats {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Export logged sessions to CSV
    Export {
        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    workout_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let trainee = cli
        .trainee
        .map(TraineeId::new)
        .unwrap_or_else(|| config.trainee_id());
    let gateway = JournalGateway::new(data_dir.join("journal"));
    tracing::debug!("Using journal at {:?} for trainee {}", gateway.sessions_path(), trainee);

    match cli.command {
        Some(Commands::Plans) => cmd_plans(),
        Some(Commands::Run { plan, plan_file }) => {
            let plan = resolve_plan(plan, plan_file)?;
            cmd_run(gateway, trainee, plan, config.tick_period()).await
        }
        Some(Commands::Stats { as_of }) => cmd_stats(&gateway, &trainee, as_of, &config).await,
        Some(Commands::Export { out }) => cmd_export(&gateway, &trainee, &out),
        None => cmd_stats(&gateway, &trainee, None, &config).await,
    }
}

fn resolve_plan(plan: Option<String>, plan_file: Option<PathBuf>) -> Result<WorkoutPlan> {
    if let Some(path) = plan_file {
        return load_plan(&path);
    }

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    let name = plan.unwrap_or_else(|| "push".to_string());
    Ok(catalog.require(&name)?.clone())
}

fn cmd_plans() -> Result<()> {
    for plan in get_default_catalog().plans.values() {
        println!("{}", plan.name);
        for exercise in &plan.exercises {
            println!(
                "  {:<24} {} x {}  rest {}s",
                exercise.name, exercise.target_sets, exercise.target_reps, exercise.rest_seconds
            );
        }
    }
    Ok(())
}

async fn cmd_run(
    gateway: JournalGateway,
    trainee: TraineeId,
    plan: WorkoutPlan,
    tick_period: Duration,
) -> Result<()> {
    // History is only used for "last time" hints
    let history: Vec<SessionRecord> = gateway
        .read_all()?
        .into_iter()
        .map(|s| s.record)
        .filter(|r| r.trainee == trainee)
        .collect();

    let engine: SharedEngine<JournalGateway> =
        Arc::new(Mutex::new(WorkoutEngine::new(Arc::new(gateway))));

    {
        let mut guard = engine.lock().await;
        guard.start(trainee.clone(), &plan, Utc::now())?;
        println!("\n╭─────────────────────────────────────────╮");
        println!("│  {} ({} exercises)", plan.name, plan.exercises.len());
        println!("╰─────────────────────────────────────────╯");
        if let Some(session) = guard.session(&trainee) {
            show_exercise(session, &history);
        }
    }
    print_help();

    let mut ticker: Option<RestTickerHandle> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\nInput closed, discarding session.");
            ticker = None;
            engine.lock().await.cancel(&trainee)?;
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Help => print_help(),
            Input::Unknown(text) => println!("Unrecognised input '{}'. Type 'h' for help.", text),

            Input::Log { weight, reps } => {
                let mut guard = engine.lock().await;
                match guard.log_set(&trainee, weight, reps, Utc::now()) {
                    Ok(logged) => {
                        println!("✓ Set {} logged: {} x {}", logged.set_number, weight, reps);
                        if let Some(rest) = logged.rest {
                            println!("  Rest {}s", rest.seconds);
                            ticker = Some(spawn_rest_ticker(
                                engine.clone(),
                                trainee.clone(),
                                rest.ticket,
                                tick_period,
                                |event| {
                                    if event == RestEvent::Complete {
                                        println!("\x07\n⏱ Rest complete, next set!");
                                    }
                                },
                            ));
                        }
                    }
                    Err(e) if e.is_usage() => println!("✗ {}", e),
                    Err(e) => return Err(e),
                }
            }

            Input::Next => {
                let mut guard = engine.lock().await;
                match guard.advance_exercise(&trainee) {
                    Ok(_) => {
                        ticker = None;
                        if let Some(session) = guard.session(&trainee) {
                            show_exercise(session, &history);
                        }
                    }
                    Err(Error::NoNextExercise) => {
                        println!("This is the last exercise. Type 'f' to finish.");
                    }
                    Err(e) => return Err(e),
                }
            }

            Input::Status => {
                let guard = engine.lock().await;
                if let Some(session) = guard.session(&trainee) {
                    let s = session.summary();
                    println!(
                        "Exercise {}/{}: {} | sets {}/{} x {}",
                        s.current_exercise + 1,
                        s.exercise_count,
                        s.exercise_name,
                        s.sets_logged,
                        s.target_sets,
                        s.target_reps
                    );
                    if s.rest_remaining > 0 {
                        println!("Resting: {}s left", s.rest_remaining);
                    }
                }
            }

            Input::Finish(details) => {
                // The ticker keeps running if the save fails and the session stays open
                let mut guard = engine.lock().await;
                match guard.finish(&trainee, Utc::now(), details).await {
                    Ok(report) => {
                        ticker = None;
                        print_report(&report);
                        break;
                    }
                    Err(e) if e.is_retryable() => {
                        tracing::warn!("Finish failed for {}: {}", trainee, e);
                        println!("✗ Could not save: {}", e);
                        println!("  Your sets are kept. Type 'f' to retry or 'c' to discard.");
                    }
                    Err(e) => return Err(e),
                }
            }

            Input::Cancel => {
                ticker = None;
                engine.lock().await.cancel(&trainee)?;
                println!("Session discarded.");
                break;
            }
        }
    }

    drop(ticker);
    Ok(())
}

async fn cmd_stats(
    gateway: &JournalGateway,
    trainee: &TraineeId,
    as_of: Option<NaiveDate>,
    config: &Config,
) -> Result<()> {
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let window = config.stats_window();
    let snapshot = fetch_snapshot(gateway, trainee, as_of, &window).await?;

    println!("Stats for {} as of {}", trainee, as_of);
    println!("  Streak:       {} days", snapshot.streak_days);
    println!(
        "  Workouts:     {} in the last {} days",
        snapshot.workouts_in_window, window.window_days
    );
    println!("  Minutes:      {}", snapshot.total_minutes_in_window);
    println!("  Weekly volume: {}", snapshot.weekly_volume);
    println!(
        "  Consistency:  {}% (target {}/week)",
        snapshot.consistency_percent, window.target_per_week
    );
    Ok(())
}

fn cmd_export(gateway: &JournalGateway, trainee: &TraineeId, out: &std::path::Path) -> Result<()> {
    let mut records: Vec<SessionRecord> = gateway
        .read_all()?
        .into_iter()
        .map(|s| s.record)
        .filter(|r| &r.trainee == trainee)
        .collect();
    records.sort_by_key(|r| r.started_at);

    let rows = workout_core::export::export_sessions(&records, out)?;
    println!("✓ Exported {} rows from {} sessions", rows, records.len());
    println!("  CSV: {}", out.display());
    Ok(())
}

fn show_exercise(session: &Session, history: &[SessionRecord]) {
    let entry = session.current_exercise();
    println!();
    println!(
        "  [{}/{}] {}: {} x {}",
        session.current_exercise_index() + 1,
        session.exercises().len(),
        entry.name,
        entry.target_sets,
        entry.target_reps
    );
    if let Some(last) = last_performance(history, &entry.name) {
        println!(
            "  Last time ({}): {} sets, top weight {}",
            last.date,
            last.entry.sets.len(),
            last.top_weight()
        );
    }
}

fn print_report(report: &FinishReport) {
    let record = &report.record;
    let sets: usize = record.exercises.iter().map(|e| e.sets.len()).sum();
    println!("\n✓ Session saved!");
    println!(
        "  {} exercises, {} sets, {} min, volume {}",
        record.exercises.len(),
        sets,
        record.minutes_or_zero(),
        record.volume().round()
    );
    for failure in &report.progress_failures {
        println!("  ! Detail for '{}' not saved: {}", failure.exercise, failure.error);
    }
}

fn print_help() {
    println!("─────────────────────────────────────────");
    println!("  <weight> <reps>     log a set (e.g. '100 5' or '100x5')");
    println!("  n                   next exercise");
    println!("  s                   status");
    println!("  f [feeling] [notes] finish and save");
    println!("  c                   cancel and discard");
    println!("  h                   help");
}

#[derive(Debug, PartialEq)]
enum Input {
    Empty,
    Help,
    Log { weight: f64, reps: u32 },
    Next,
    Status,
    Finish(FinishDetails),
    Cancel,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default().to_lowercase();

    match head.as_str() {
        "h" | "help" | "?" => return Input::Help,
        "n" | "next" => return Input::Next,
        "s" | "status" => return Input::Status,
        "c" | "cancel" => return Input::Cancel,
        "f" | "finish" => {
            let rest: Vec<&str> = parts.collect();
            let (feeling, notes) = match rest.first().map(|w| w.parse::<Feeling>()) {
                Some(Ok(feeling)) => (feeling, &rest[1..]),
                _ => (Feeling::default(), &rest[..]),
            };
            let notes = if notes.is_empty() {
                None
            } else {
                Some(notes.join(" "))
            };
            return Input::Finish(FinishDetails { feeling, notes });
        }
        _ => {}
    }

    parse_set(line).unwrap_or_else(|| Input::Unknown(line.to_string()))
}

/// Accepts "100 5", "100x5" and "100 x 5"
fn parse_set(line: &str) -> Option<Input> {
    let normalized = line.to_lowercase().replace('x', " ");
    let mut parts = normalized.split_whitespace();
    let weight = parts.next()?.parse::<f64>().ok()?;
    let reps = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Input::Log { weight, reps })
}
