mod cli;
mod config;
mod report;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::Cli;
use config::Config;
use permkit::Client;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if cli.no_color {
        ui::disable_colors();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tfperms", &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_cli(cli)?;
    log::debug!("Configuration: {config:?}");

    let client = Client::new(config.backend());
    let report = client
        .run(&config.pipeline_options())
        .with_context(|| format!("Could not derive permissions for {}", config.dir.display()))?;

    if !report.unmapped.is_empty() {
        log::info!(
            "{} action(s) have no entry in {}:",
            report.unmapped.len(),
            config.permissions.display()
        );
        for record in &report.unmapped {
            log::info!("  {record}");
        }
    }

    if report.records.is_empty() && !cli.quiet {
        ui::warn("No resources found in state or plan");
    }

    report::print(&report, config.format)?;

    // Kept off stdout so the permissions section stays one permission per line
    if report.permissions.is_empty() && !cli.quiet {
        ui::warn("No permissions mapped");
    }

    Ok(())
}
