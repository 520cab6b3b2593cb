//! htrack - Command-line interface for the health tracker
//!
//! Commands:
//! - report: Dashboard for a day (score, rank, flags, trends, adherence)
//! - check-in: Log or update a day's record
//! - score / risk: Score or flag a single record
//! - compare / adherence: Windowed analytics over the stored history
//! - family: Show or edit the family history
//! - validate: Validate a record history
//! - reset: Drop the stored history
//! - init: Write the config file and create the data directory
//! - doctor: Diagnose configuration and stored data

use chrono::{DateTime, FixedOffset, Local, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use health_tracker::catalog::{fields_by_category, Category};
use health_tracker::config::{load_config, save_config, TrackerConfig, CONFIG_FILE_NAME};
use health_tracker::dates::{parse_date_key, to_date_key};
use health_tracker::types::{
    Analytics, FamilyCondition, MetricAverages, MetricKey, ScoreBreakdown, SupplementAdherence,
};
use health_tracker::{
    compare_periods, evaluate_risk, health_rank, score_breakdown, supplement_adherence,
    validate_records, DailyRecord, FamilyHistory, FileBackend, HealthReport, HealthTracker,
    TrackerError, PRODUCER_NAME, TRACKER_VERSION,
};

/// htrack - Score, flag and analyze daily health check-ins
#[derive(Parser)]
#[command(name = "htrack")]
#[command(version = TRACKER_VERSION)]
#[command(about = "Score, flag and analyze daily health check-ins", long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard report for a day
    Report {
        /// Day to report on (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Log or update a day's check-in
    CheckIn {
        /// Record JSON file (use - for stdin); defaults to the stored record
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Day to check in (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Set a metric, e.g. --set sleepHours=7.5
        #[arg(long = "set", value_name = "METRIC=VALUE", value_parser = parse_assignment)]
        set: Vec<(MetricKey, f64)>,

        /// Clear a metric
        #[arg(long, value_name = "METRIC")]
        clear: Vec<MetricKey>,

        /// Toggle a supplement from the stack
        #[arg(long, value_name = "NAME")]
        toggle: Vec<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Score a record (input file or the stored record for a day)
    Score {
        /// Record JSON file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Stored day to score (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Evaluate risk rules for a record
    Risk {
        /// Record JSON file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Stored day to evaluate (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Compare the most recent window with the one before it
    Compare {
        /// Window length in records
        #[arg(long)]
        days: Option<usize>,
    },

    /// Supplement adherence over the most recent window
    Adherence {
        /// Window length in records
        #[arg(long)]
        days: Option<usize>,
    },

    /// Show or edit the family history
    Family {
        #[command(subcommand)]
        action: FamilyAction,
    },

    /// Validate a record history (input file or the stored history)
    Validate {
        /// Records JSON file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Drop every stored record
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Write the config file and create the data directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Diagnose configuration and stored data
    Doctor,
}

#[derive(Subcommand)]
enum FamilyAction {
    /// Print the stored family history
    Show,

    /// Replace the family history from a JSON file (use - for stdin)
    Set {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Add a condition
    Add {
        /// Condition name (e.g. "Type 2 Diabetes")
        #[arg(long)]
        condition: String,

        /// Relation (e.g. "Father")
        #[arg(long)]
        relation: String,

        /// Age of onset
        #[arg(long)]
        age_of_onset: Option<f64>,
    },

    /// Set the blood type
    BloodType { value: String },

    /// Remove every condition
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run(cli: Cli) -> Result<(), HtrackCliError> {
    let mut config = load_config(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    init_tracing(&config.log_level);
    debug!(config = %cli.config.display(), data_dir = %config.data_dir.display(), "loaded config");

    let mut tracker = HealthTracker::new(FileBackend::new(&config.data_dir), config.windows);
    let json = cli.json;

    match cli.command {
        Commands::Report { date } => cmd_report(&tracker, date.as_deref(), json),

        Commands::CheckIn {
            input,
            date,
            set,
            clear,
            toggle,
            notes,
        } => cmd_check_in(
            &mut tracker,
            CheckInArgs {
                input,
                date,
                set,
                clear,
                toggle,
                notes,
            },
            json,
        ),

        Commands::Score { input, date } => {
            cmd_score(&tracker, input.as_deref(), date.as_deref(), json)
        }

        Commands::Risk { input, date } => {
            cmd_risk(&tracker, input.as_deref(), date.as_deref(), json)
        }

        Commands::Compare { days } => {
            cmd_compare(&tracker, days.unwrap_or(config.windows.comparison_days), json)
        }

        Commands::Adherence { days } => {
            cmd_adherence(&tracker, days.unwrap_or(config.windows.adherence_days), json)
        }

        Commands::Family { action } => cmd_family(&mut tracker, action, json),

        Commands::Validate { input } => cmd_validate(&tracker, input.as_deref(), json),

        Commands::Reset { yes } => cmd_reset(&mut tracker, yes, json),

        Commands::Init { force } => cmd_init(&cli.config, &config, &tracker, force, json),

        Commands::Doctor => cmd_doctor(&cli.config, &config, &tracker, json),
    }
}

fn cmd_report(
    tracker: &HealthTracker<FileBackend>,
    date: Option<&str>,
    json: bool,
) -> Result<(), HtrackCliError> {
    let reference = reference_for(date)?;
    let report = tracker.report(&reference);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, tracker.windows().trend_days);
    }

    Ok(())
}

struct CheckInArgs {
    input: Option<PathBuf>,
    date: Option<String>,
    set: Vec<(MetricKey, f64)>,
    clear: Vec<MetricKey>,
    toggle: Vec<String>,
    notes: Option<String>,
}

fn cmd_check_in(
    tracker: &mut HealthTracker<FileBackend>,
    args: CheckInArgs,
    json: bool,
) -> Result<(), HtrackCliError> {
    let today = to_date_key(&Local::now());
    let date = args.date.clone().unwrap_or_else(|| today.clone());

    // Start from the input, else the stored record, else the form defaults
    let mut record = match &args.input {
        Some(path) => serde_json::from_str::<DailyRecord>(&read_input(path)?)?,
        None => tracker
            .record_for(&date)
            .cloned()
            .unwrap_or_else(|| DailyRecord::check_in_defaults(date.as_str())),
    };
    if let Some(explicit) = args.date {
        record.date = explicit;
    } else if record.date.is_empty() {
        record.date = today;
    }

    for (key, value) in args.set {
        record.set_metric(key, Some(value));
    }
    for key in args.clear {
        record.set_metric(key, None);
    }
    if !args.toggle.is_empty() {
        let stack = tracker.supplement_stack()?;
        for name in &args.toggle {
            record.toggle_supplement(&stack, name);
        }
    }
    if let Some(notes) = args.notes {
        record.notes = notes;
    }

    tracker.check_in(record.clone())?;
    info!(date = %record.date, "saved check-in");

    let score = score_breakdown(Some(&record));
    let flags = evaluate_risk(&record, Some(tracker.family_history()));

    if json {
        let summary = serde_json::json!({
            "record": record,
            "score": score,
            "rank": health_rank(score.total),
            "riskFlags": flags,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Saved check-in for {} ({} metrics measured)",
            record.date,
            record.measured_count()
        );
        print_score(&score);
        print_list("Risk flags", &flags);
    }

    Ok(())
}

fn cmd_score(
    tracker: &HealthTracker<FileBackend>,
    input: Option<&Path>,
    date: Option<&str>,
    json: bool,
) -> Result<(), HtrackCliError> {
    let record = select_record(tracker, input, date)?;
    let score = score_breakdown(record.as_ref());

    if json {
        let summary = serde_json::json!({
            "score": score,
            "rank": health_rank(score.total),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_score(&score);
        println!("\nParts:");
        for (key, points) in &score.parts {
            println!("  {:<18} {}", key.as_str(), format_points(*points));
        }
    }

    Ok(())
}

fn cmd_risk(
    tracker: &HealthTracker<FileBackend>,
    input: Option<&Path>,
    date: Option<&str>,
    json: bool,
) -> Result<(), HtrackCliError> {
    let Some(record) = select_record(tracker, input, date)? else {
        let date = date
            .map(str::to_string)
            .unwrap_or_else(|| to_date_key(&Local::now()));
        return Err(HtrackCliError::NoRecord(date));
    };
    let flags = evaluate_risk(&record, Some(tracker.family_history()));

    if json {
        println!("{}", serde_json::to_string_pretty(&flags)?);
    } else if flags.is_empty() {
        println!("No risk flags for {}", record.date);
    } else {
        print_list(&format!("Risk flags for {}", record.date), &flags);
    }

    Ok(())
}

fn cmd_compare(
    tracker: &HealthTracker<FileBackend>,
    days: usize,
    json: bool,
) -> Result<(), HtrackCliError> {
    let comparison = compare_periods(tracker.records(), days);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    match comparison {
        None => println!("Not enough history to compare two {days}-record windows"),
        Some(deltas) => {
            println!("Last {days} vs previous {days} records");
            println!("{}", "=".repeat(40));
            for (key, delta) in &deltas {
                println!(
                    "  {:<18} {:>8.1} {:>8.1} {:>+8.1}",
                    key.as_str(),
                    delta.recent,
                    delta.prior,
                    delta.delta
                );
            }
        }
    }

    Ok(())
}

fn cmd_adherence(
    tracker: &HealthTracker<FileBackend>,
    days: usize,
    json: bool,
) -> Result<(), HtrackCliError> {
    let adherence = supplement_adherence(tracker.records(), days);

    if json {
        println!("{}", serde_json::to_string_pretty(&adherence)?);
    } else if adherence.is_empty() {
        println!("No supplements logged in the last {days} records");
    } else {
        print_adherence(&adherence, days);
    }

    Ok(())
}

fn cmd_family(
    tracker: &mut HealthTracker<FileBackend>,
    action: FamilyAction,
    json: bool,
) -> Result<(), HtrackCliError> {
    let updated = match action {
        FamilyAction::Show => None,
        FamilyAction::Set { input } => {
            Some(serde_json::from_str::<FamilyHistory>(&read_input(&input)?)?)
        }
        FamilyAction::Add {
            condition,
            relation,
            age_of_onset,
        } => {
            let mut history = tracker.family_history().clone();
            history.conditions.push(FamilyCondition {
                condition,
                relation,
                age_of_onset,
            });
            Some(history)
        }
        FamilyAction::BloodType { value } => Some(FamilyHistory {
            blood_type: value,
            ..tracker.family_history().clone()
        }),
        FamilyAction::Clear => Some(FamilyHistory {
            conditions: Vec::new(),
            ..tracker.family_history().clone()
        }),
    };

    if let Some(history) = updated {
        tracker.save_family_history(&history, Utc::now())?;
    }
    let history = tracker.family_history();

    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
    } else {
        println!("Family History");
        println!("==============");
        println!(
            "Blood type: {}",
            if history.blood_type.is_empty() { "--" } else { history.blood_type.as_str() }
        );
        if let Some(updated_at) = history.updated_at {
            println!("Updated:    {}", updated_at.to_rfc3339());
        }
        if history.conditions.is_empty() {
            println!("\nNo conditions recorded");
        } else {
            println!("\nConditions:");
            for c in &history.conditions {
                let onset = c
                    .age_of_onset
                    .map(|age| format!(", onset at {age}"))
                    .unwrap_or_default();
                println!("  - {} ({}{})", c.condition, c.relation, onset);
            }
        }
    }

    Ok(())
}

fn cmd_validate(
    tracker: &HealthTracker<FileBackend>,
    input: Option<&Path>,
    json: bool,
) -> Result<(), HtrackCliError> {
    let records = match input {
        Some(path) => serde_json::from_str::<Vec<DailyRecord>>(&read_input(path)?)?,
        None => tracker.records().to_vec(),
    };
    let issues = validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - issues.len(),
        invalid_records: issues.len(),
        errors: issues
            .into_iter()
            .map(|issue| ValidationErrorDetail {
                index: issue.index,
                date: issue.date,
                error: issue.error,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {} (index {}): {}", err.date, err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(HtrackCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_reset(
    tracker: &mut HealthTracker<FileBackend>,
    yes: bool,
    json: bool,
) -> Result<(), HtrackCliError> {
    if !yes {
        return Err(HtrackCliError::ConfirmationRequired);
    }

    let dropped = tracker.records().len();
    tracker.reset_history()?;
    info!(dropped, "reset history");

    if json {
        println!("{}", serde_json::json!({ "dropped": dropped }));
    } else {
        println!("Dropped {dropped} records");
    }

    Ok(())
}

fn cmd_init(
    config_path: &Path,
    config: &TrackerConfig,
    tracker: &HealthTracker<FileBackend>,
    force: bool,
    json: bool,
) -> Result<(), HtrackCliError> {
    if config_path.exists() && !force {
        return Err(HtrackCliError::ConfigExists(config_path.to_path_buf()));
    }

    let data_dir = tracker.store().backend().root();
    fs::create_dir_all(data_dir)?;
    save_config(config_path, config)?;
    info!(config = %config_path.display(), "wrote config");

    if json {
        let summary = serde_json::json!({
            "config": config_path.display().to_string(),
            "dataDir": data_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Wrote {}", config_path.display());
        println!("Data directory: {}", data_dir.display());
    }

    Ok(())
}

fn cmd_doctor(
    config_path: &Path,
    config: &TrackerConfig,
    tracker: &HealthTracker<FileBackend>,
    json: bool,
) -> Result<(), HtrackCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "tracker_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, TRACKER_VERSION),
    });

    // Config already parsed by the time we get here
    checks.push(if config_path.exists() {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "{} (windows: trend {}, compare {}, adherence {})",
                config_path.display(),
                config.windows.trend_days,
                config.windows.comparison_days,
                config.windows.adherence_days
            ),
        }
    } else {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "{} not found, using defaults (run 'htrack init')",
                config_path.display()
            ),
        }
    });

    let data_dir = tracker.store().backend().root();
    checks.push(if data_dir.is_dir() {
        DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Ok,
            message: format!("{}", data_dir.display()),
        }
    } else if data_dir.exists() {
        DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Error,
            message: format!("{} is not a directory", data_dir.display()),
        }
    } else {
        DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} does not exist yet (run 'htrack init')", data_dir.display()),
        }
    });

    let issues = validate_records(tracker.records());
    checks.push(DoctorCheck {
        name: "records".to_string(),
        status: if issues.is_empty() { CheckStatus::Ok } else { CheckStatus::Warning },
        message: format!(
            "{} records stored, {} with validation issues",
            tracker.records().len(),
            issues.len()
        ),
    });

    let stack = tracker.store().load_supplement_stack();
    checks.push(DoctorCheck {
        name: "supplements".to_string(),
        status: CheckStatus::Ok,
        message: if stack.is_empty() {
            "No supplement stack saved (defaults seeded on first --toggle)".to_string()
        } else {
            format!("{} supplements in stack", stack.len())
        },
    });

    // Check stdin is available (for --input -)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TRACKER_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("htrack Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(HtrackCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, HtrackCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_assignment(raw: &str) -> Result<(MetricKey, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected METRIC=VALUE, got '{raw}'"))?;
    let key: MetricKey = key.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {key}: {e}"))?;
    Ok((key, value))
}

/// Reference instant for a day key, or now (local) when absent
fn reference_for(date: Option<&str>) -> Result<DateTime<FixedOffset>, HtrackCliError> {
    match date {
        None => Ok(Local::now().into()),
        Some(raw) => {
            let day = parse_date_key(raw)
                .ok_or_else(|| HtrackCliError::InvalidDate(raw.to_string()))?;
            Ok(Utc.from_utc_datetime(&day.and_time(NaiveTime::default())).into())
        }
    }
}

fn select_record(
    tracker: &HealthTracker<FileBackend>,
    input: Option<&Path>,
    date: Option<&str>,
) -> Result<Option<DailyRecord>, HtrackCliError> {
    if let Some(path) = input {
        return Ok(Some(serde_json::from_str(&read_input(path)?)?));
    }

    let date = match date {
        Some(raw) if parse_date_key(raw).is_none() => {
            return Err(HtrackCliError::InvalidDate(raw.to_string()))
        }
        Some(raw) => raw.to_string(),
        None => to_date_key(&Local::now()),
    };
    Ok(tracker.record_for(&date).cloned())
}

fn format_points(points: Option<u32>) -> String {
    points.map(|p| p.to_string()).unwrap_or_else(|| "--".to_string())
}

fn format_average(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "--".to_string())
}

fn print_score(score: &ScoreBreakdown) {
    println!(
        "Score: {}/100 ({}), confidence {}%",
        score.total,
        health_rank(score.total),
        score.confidence
    );
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for item in items {
        println!("  - {item}");
    }
}

fn print_trends(analytics: &Analytics, window: usize) {
    let averages = |avg: &MetricAverages, key: MetricKey| format_average(avg.get(key));

    println!("\nTrends (last {window} vs previous {window}):");
    for (key, trend) in &analytics.trends {
        println!(
            "  {:<18} {:>8} {:>8}  {}",
            key.as_str(),
            averages(&analytics.last7_avg, *key),
            averages(&analytics.prev7_avg, *key),
            trend.as_str()
        );
    }
}

fn print_adherence(adherence: &[SupplementAdherence], window: usize) {
    println!("\nSupplements (last {window}):");
    for entry in adherence {
        println!(
            "  {:<14} {:>3}/{:<3} ({}%)",
            entry.name, entry.taken, entry.total, entry.rate
        );
    }
}

fn print_record(record: &DailyRecord) {
    for category in [
        Category::Core,
        Category::Vitals,
        Category::Blood,
        Category::Mind,
        Category::Environment,
    ] {
        let measured: Vec<String> = fields_by_category(category)
            .filter_map(|field| {
                record.metric(field.key).map(|value| match field.unit {
                    "" => format!("{} {}", field.label, value),
                    unit if unit.starts_with('/') => format!("{} {}{}", field.label, value, unit),
                    unit => format!("{} {} {}", field.label, value, unit),
                })
            })
            .collect();
        if !measured.is_empty() {
            println!("{}: {}", category.label(), measured.join(", "));
        }
    }
}

fn print_report(report: &HealthReport, trend_window: usize) {
    let title = format!("Health Report {}", report.date_key);
    println!("{title}");
    println!("{}", "=".repeat(title.len()));

    match &report.today {
        Some(record) => print_record(record),
        None => println!("No check-in for this day"),
    }
    print_score(&report.score);
    println!("Streak: {} days", report.streak);

    print_list("Risk flags", &report.risk_flags);
    print_list("Anomalies", &report.analytics.anomalies);
    print_trends(&report.analytics, trend_window);

    if !report.adherence.is_empty() {
        let window = report.adherence[0].total;
        print_adherence(&report.adherence, window);
    }

    println!("\nLast 7 days:");
    for day in &report.weekly {
        println!(
            "  {}  sleep {:>5}  steps {:>7}  mood {:>4}",
            day.date,
            format_average(day.sleep),
            day.steps.map(|s| format!("{s:.0}")).unwrap_or_else(|| "--".to_string()),
            format_average(day.mood)
        );
    }
}

// Error types

#[derive(Debug)]
enum HtrackCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Tracker(TrackerError),
    InvalidDate(String),
    NoRecord(String),
    ValidationFailed(usize),
    ConfirmationRequired,
    ConfigExists(PathBuf),
    DoctorFailed,
}

impl From<io::Error> for HtrackCliError {
    fn from(e: io::Error) -> Self {
        HtrackCliError::Io(e)
    }
}

impl From<serde_json::Error> for HtrackCliError {
    fn from(e: serde_json::Error) -> Self {
        HtrackCliError::Json(e)
    }
}

impl From<TrackerError> for HtrackCliError {
    fn from(e: TrackerError) -> Self {
        HtrackCliError::Tracker(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HtrackCliError> for CliError {
    fn from(e: HtrackCliError) -> Self {
        match e {
            HtrackCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HtrackCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HtrackCliError::Tracker(e) => {
                let (code, hint) = match &e {
                    TrackerError::InvalidRecord(_) => {
                        ("INVALID_RECORD", "Run 'htrack validate' for details")
                    }
                    TrackerError::ConfigParse(_) | TrackerError::ConfigSerialize(_) => {
                        ("CONFIG_ERROR", "Check the htrack.toml syntax")
                    }
                    TrackerError::IoError(_) => {
                        ("IO_ERROR", "Check the data directory permissions")
                    }
                    TrackerError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    _ => ("TRACKER_ERROR", "Run 'htrack doctor' to diagnose"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            HtrackCliError::InvalidDate(raw) => CliError {
                code: "INVALID_DATE".to_string(),
                message: format!("Invalid date '{}'", raw),
                hint: Some("Use YYYY-MM-DD".to_string()),
            },
            HtrackCliError::NoRecord(date) => CliError {
                code: "NO_RECORD".to_string(),
                message: format!("No record stored for {}", date),
                hint: Some("Run 'htrack check-in' first or pass --input".to_string()),
            },
            HtrackCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            HtrackCliError::ConfirmationRequired => CliError {
                code: "CONFIRMATION_REQUIRED".to_string(),
                message: "Reset drops every stored record".to_string(),
                hint: Some("Pass --yes to confirm".to_string()),
            },
            HtrackCliError::ConfigExists(path) => CliError {
                code: "CONFIG_EXISTS".to_string(),
                message: format!("{} already exists", path.display()),
                hint: Some("Pass --force to overwrite".to_string()),
            },
            HtrackCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
