//! rentroll binary
//!
//! Exit status: 0 when the run succeeded with no critical findings, 1 when
//! critical findings remain, 2 when the run itself failed.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rentroll_cli::{loader, OutputFormat, Runner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "rentroll")]
#[command(
    version,
    about = "Resolve a lease ledger into rent rolls, absorption and integrity reports"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "console", global = true)]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct LedgerArg {
    /// Ledger JSON document
    #[arg(short, long)]
    ledger: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rent roll for one date
    RentRoll {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Same-store absorption between two dates, with an integrity report
    Absorption {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Date for the integrity checks; defaults to --to
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Integrity checks over the raw ledger
    Validate {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Write a repaired ledger version plus its audit chain
    Remediate {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value = "remediated")]
        out_dir: PathBuf,
    },
    /// Rebuild the ledger a remediation started from
    Revert {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        audit: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Month-end occupancy and rent series
    Trend {
        #[command(flatten)]
        ledger: LedgerArg,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // stdout carries reports, so logs go to stderr
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args) {
        Ok(outcome) => {
            eprintln!(
                "{} findings, {} critical",
                outcome.findings, outcome.critical
            );
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<rentroll_cli::Outcome> {
    let config = loader::load_config(args.config.as_deref())?;
    let runner = Runner::new(config, args.format, args.output);

    match args.command {
        Command::RentRoll { ledger, as_of } => runner.rent_roll(&ledger.ledger, runner.as_of(as_of)),
        Command::Absorption {
            ledger,
            from,
            to,
            as_of,
        } => runner.absorption(&ledger.ledger, from, to, as_of.unwrap_or(to)),
        Command::Validate { ledger, as_of } => runner.validate(&ledger.ledger, runner.as_of(as_of)),
        Command::Remediate {
            ledger,
            as_of,
            out_dir,
        } => runner.remediate(&ledger.ledger, runner.as_of(as_of), &out_dir),
        Command::Revert { ledger, audit, out } => runner.revert(&ledger.ledger, &audit, &out),
        Command::Trend { ledger, from, to } => runner.trend(&ledger.ledger, from, to),
    }
}
