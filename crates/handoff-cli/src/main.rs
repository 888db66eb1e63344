//! `handoff` CLI — reconcile donor closing and recipient opening times from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Next handoff window for a donor/recipient pair (user records or bare
//! # operatingHours objects)
//! handoff reconcile --donor donor.json --recipient recipient.json
//!
//! # Pin the clock and zone for reproducible output
//! handoff --now 2026-03-16T12:00:00 --timezone America/New_York \
//!     reconcile --donor donor.json --recipient recipient.json
//!
//! # Emit the accepted-handoff record instead
//! handoff reconcile --donor donor.json --recipient recipient.json --record
//!
//! # One side only (stdin when --schedule is omitted)
//! cat donor.json | handoff next-closing
//! handoff next-opening -s recipient.json --after 2026-03-16T18:00:00
//!
//! # Check how a time string will be read
//! handoff --strict parse-time "9:30 AM"
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{ArgAction, Parser, Subcommand};
use handoff_engine::{
    format_optional, parse_instant, parse_timezone, parse_wall_clock_time,
    parse_wall_clock_time_strict, AcceptedHandoff, ParseMode, Party, Reconciler, WeeklySchedule,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "handoff",
    version,
    about = "Reconcile donor closing and recipient opening times"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// IANA time zone the operating hours are written in
    #[arg(long, global = true, default_value = "UTC")]
    timezone: String,

    /// Current time (RFC 3339, or YYYY-MM-DDTHH:MM[:SS] in --timezone).
    /// Defaults to the system clock.
    #[arg(long, global = true)]
    now: Option<String>,

    /// Reject malformed times instead of reading them as midnight
    #[arg(long, global = true)]
    strict: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the donor's next closing time and the recipient's next opening after it
    Reconcile {
        /// Donor user record or operatingHours JSON file
        #[arg(long)]
        donor: String,
        /// Recipient user record or operatingHours JSON file
        #[arg(long)]
        recipient: String,
        /// Print the accepted-handoff record (needs id and name on both records)
        #[arg(long)]
        record: bool,
        /// Acceptance time stamped on the --record output. Defaults to the
        /// scan's clock, so a pinned --now also pins the timestamp.
        #[arg(long, requires = "record")]
        accepted_at: Option<String>,
    },
    /// Find a schedule's next closing time
    NextClosing {
        /// Schedule file (reads from stdin if omitted)
        #[arg(short, long)]
        schedule: Option<String>,
    },
    /// Find a schedule's next opening time after an anchor instant
    NextOpening {
        /// Schedule file (reads from stdin if omitted)
        #[arg(short, long)]
        schedule: Option<String>,
        /// Anchor instant, usually the donor's closing time
        #[arg(long)]
        after: String,
    },
    /// Show how a wall-clock string is read
    ParseTime {
        /// Time text, e.g. "9:30 AM"
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowOutput {
    donor_closing: Option<String>,
    recipient_opening: Option<String>,
    donor_closing_display: String,
    recipient_opening_display: String,
    feasible: bool,
}

#[derive(Serialize)]
struct InstantOutput {
    instant: Option<String>,
    display: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let tz = parse_timezone(&cli.timezone)?;
    let now = resolve_now(cli.now.as_deref(), &tz)?;
    let mode = if cli.strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    let reconciler = Reconciler::new(mode);
    debug!(%now, ?mode, "starting");

    match cli.command {
        Commands::Reconcile {
            donor,
            recipient,
            record,
            accepted_at,
        } => {
            let donor_record = load_record(Some(&donor))?;
            let recipient_record = load_record(Some(&recipient))?;
            let donor_hours = WeeklySchedule::from_record(&donor_record)
                .with_context(|| format!("Failed to read donor schedule from {}", donor))?;
            let recipient_hours = WeeklySchedule::from_record(&recipient_record)
                .with_context(|| format!("Failed to read recipient schedule from {}", recipient))?;

            let window = reconciler
                .reconcile(&donor_hours, &recipient_hours, &now)
                .context("Failed to reconcile schedules")?;

            if record {
                let donor_party =
                    Party::from_record(&donor_record).context("Donor record is incomplete")?;
                let recipient_party = Party::from_record(&recipient_record)
                    .context("Recipient record is incomplete")?;
                let accepted_at = match accepted_at.as_deref() {
                    Some(text) => parse_instant(text, &tz)
                        .with_context(|| format!("Invalid --accepted-at instant: {}", text))?,
                    None => now.clone(),
                };
                let accepted = AcceptedHandoff::new(
                    &donor_party,
                    &recipient_party,
                    &window,
                    accepted_at.with_timezone(&Utc),
                );
                println!("{}", serde_json::to_string_pretty(&accepted)?);
                return Ok(());
            }

            let (closing_display, opening_display) = window.display_pair();
            if cli.json {
                let output = WindowOutput {
                    donor_closing: window.donor_closing.as_ref().map(DateTime::to_rfc3339),
                    recipient_opening: window.recipient_opening.as_ref().map(DateTime::to_rfc3339),
                    donor_closing_display: closing_display,
                    recipient_opening_display: opening_display,
                    feasible: window.is_feasible(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Donor closes:     {}", closing_display);
                println!("Recipient opens:  {}", opening_display);
            }
        }
        Commands::NextClosing { schedule } => {
            let hours = load_schedule(schedule.as_deref())?;
            let closing = reconciler
                .next_closing(&hours, &now)
                .context("Failed to scan closing times")?;
            print_instant(closing.as_ref(), cli.json)?;
        }
        Commands::NextOpening { schedule, after } => {
            let hours = load_schedule(schedule.as_deref())?;
            let anchor = parse_instant(&after, &tz)
                .with_context(|| format!("Invalid --after instant: {}", after))?;
            let opening = reconciler
                .next_opening(&hours, &anchor, &now)
                .context("Failed to scan opening times")?;
            print_instant(opening.as_ref(), cli.json)?;
        }
        Commands::ParseTime { text } => {
            let time = match mode {
                ParseMode::Strict => parse_wall_clock_time_strict(&text)?,
                ParseMode::Lenient => parse_wall_clock_time(&text),
            };
            if cli.json {
                println!("{}", serde_json::to_string(&time)?);
            } else {
                println!("{}", time);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides
/// the `-v` level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// The clock is sampled once, here; every scan uses this value.
fn resolve_now(text: Option<&str>, tz: &Tz) -> Result<DateTime<Tz>> {
    match text {
        Some(text) => {
            parse_instant(text, tz).with_context(|| format!("Invalid --now instant: {}", text))
        }
        None => Ok(Utc::now().with_timezone(tz)),
    }
}

fn print_instant(instant: Option<&DateTime<Tz>>, json: bool) -> Result<()> {
    let display = format_optional(instant);
    if json {
        let output = InstantOutput {
            instant: instant.map(DateTime::to_rfc3339),
            display,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", display);
    }
    Ok(())
}

fn load_schedule(path: Option<&str>) -> Result<WeeklySchedule> {
    let record = load_record(path)?;
    let source = path.unwrap_or("stdin");
    WeeklySchedule::from_record(&record)
        .with_context(|| format!("Failed to read schedule from {}", source))
}

fn load_record(path: Option<&str>) -> Result<Value> {
    let raw = read_input(path)?;
    let source = path.unwrap_or("stdin");
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", source))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
