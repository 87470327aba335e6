use crate::cli::OutputFormat;
use crate::ui;
use anyhow::{Context, Result};
use permkit::Report;
use std::io::{self, Write};

pub const ACTIONS_TITLE: &str = "Terraform Actions to Take:";
pub const PERMISSIONS_TITLE: &str = "Required permissions for deployment role:";

/// Print the report to stdout
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write(&mut out, report, format)?;
    out.flush().context("Failed to write report")
}

pub fn write(out: &mut impl Write, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report),
        OutputFormat::Json => write_json(out, report),
    }
    .context("Failed to write report")
}

fn write_plain(out: &mut impl Write, report: &Report) -> io::Result<()> {
    writeln!(out, "{}", ui::banner(ACTIONS_TITLE))?;
    for record in &report.records {
        writeln!(out, "{record}")?;
    }

    writeln!(out, "{}", ui::banner(PERMISSIONS_TITLE))?;
    for permission in &report.permissions {
        writeln!(out, "{permission}")?;
    }

    Ok(())
}

fn write_json(out: &mut impl Write, report: &Report) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}
