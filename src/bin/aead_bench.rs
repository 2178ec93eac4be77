//! `aead-bench` command-line entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TerminalMode, TermLogger};
use aead_bench::cli::{execute, Options, RunStatus};

fn main() -> Result<ExitCode> {
    let options = Options::parse();
    TermLogger::init(
        if options.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto
    )?;
    match execute(&options.to_config())? {
        RunStatus::MissingInputs(missing) => {
            error!("these files do not exist:");
            for path in missing {
                error!("   {}", path.display());
            }
            Ok(ExitCode::FAILURE)
        }
        RunStatus::Completed { report, .. } => {
            for path in [Some(&report.raw), Some(&report.summary), report.wall_chart.as_ref(), report.cpu_chart.as_ref()]
                .into_iter()
                .flatten()
            {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
