//! CLI entrypoint for the gcmt scenario harness.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gcmt_harness::scenarios::{Scenario, ScenarioReport, run_all};
use gcmt_harness::structured_log::{LogEmitter, validate_log_file};

/// Threading scenario runner for gcmt.
#[derive(Debug, Parser)]
#[command(name = "gcmt-harness")]
#[command(about = "Run gcmt threading scenarios and check their JSONL logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run scenarios and write one JSONL entry per result.
    Run {
        /// Output JSONL path (if omitted, prints to stdout).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Scenarios to run (default: all).
        #[arg(long, value_enum)]
        scenario: Vec<Scenario>,
        /// Run id embedded in every trace id.
        #[arg(long, default_value = "local")]
        run_id: String,
    },
    /// Validate a JSONL log written by `run`.
    Validate {
        #[arg(long)]
        log: PathBuf,
    },
    /// List available scenarios.
    List,
}

fn summarize(reports: &[ScenarioReport]) -> ExitCode {
    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.passed())
        .map(|r| r.scenario.name())
        .collect();
    eprintln!(
        "{} scenario(s) on the {} back-end, {} failed",
        reports.len(),
        gcmt::backend_name(),
        failed.len()
    );
    if failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        eprintln!("failed: {}", failed.join(", "));
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            log,
            scenario,
            run_id,
        } => {
            let scenarios = if scenario.is_empty() {
                Scenario::ALL.to_vec()
            } else {
                scenario
            };
            let result = match log {
                Some(path) => match LogEmitter::to_file(&path, &run_id) {
                    Ok(mut emitter) => run_all(&scenarios, &mut emitter),
                    Err(err) => {
                        eprintln!("cannot create {}: {err}", path.display());
                        return ExitCode::FAILURE;
                    }
                },
                None => run_all(&scenarios, &mut LogEmitter::to_stdout(&run_id)),
            };
            match result {
                Ok(reports) => summarize(&reports),
                Err(err) => {
                    eprintln!("harness error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Validate { log } => match validate_log_file(&log) {
            Ok((lines, errors)) if errors.is_empty() => {
                eprintln!("{}: {lines} valid line(s)", log.display());
                ExitCode::SUCCESS
            }
            Ok((lines, errors)) => {
                for err in &errors {
                    eprintln!("{err}");
                }
                eprintln!("{}: {} error(s) in {lines} line(s)", log.display(), errors.len());
                ExitCode::FAILURE
            }
            Err(err) => {
                eprintln!("cannot read {}: {err}", log.display());
                ExitCode::FAILURE
            }
        },
        Command::List => {
            for s in Scenario::ALL {
                println!("{}", s.name());
            }
            ExitCode::SUCCESS
        }
    }
}
