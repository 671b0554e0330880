use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use iriguchi_core::{resolve, Format};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Executable entry-point inspection CLI
#[derive(Parser)]
#[command(
    name = "binentry",
    about = "Locate the load address and entry point of Mach-O, PE, and ELF binaries",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the load address and entry offset of each binary
    Entry {
        /// Paths to binary files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the detected container format of each binary
    Format {
        /// Paths to binary files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Summarize each binary as one table row
    Info {
        /// Paths to binary files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// What one successfully inspected binary looks like to every subcommand.
#[derive(Serialize)]
struct Report {
    path: String,
    format: &'static str,
    bits: u8,
    load_address: u64,
    entry_offset: u64,
    entry_address: u64,
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Binary")]
    path: String,
    #[tabled(rename = "Format")]
    format: &'static str,
    #[tabled(rename = "Load address")]
    load_address: String,
    #[tabled(rename = "Entry offset")]
    entry_offset: String,
    #[tabled(rename = "Entry VA")]
    entry_address: String,
}

impl From<&Report> for Row {
    fn from(report: &Report) -> Self {
        Row {
            path: report.path.clone(),
            format: report.format,
            load_address: format!("0x{:x}", report.load_address),
            entry_offset: format!("0x{:x}", report.entry_offset),
            entry_address: format!("0x{:x}", report.entry_address),
        }
    }
}

fn inspect(path: &Path) -> Result<Report> {
    log::debug!("Reading {}", path.display());
    let data = std::fs::read(path)?;
    let format = Format::detect(&data)?;
    let entry = resolve(&data)?;

    Ok(Report {
        path: path.display().to_string(),
        format: format.name(),
        bits: if format.is_64() { 64 } else { 32 },
        load_address: entry.load_address,
        entry_offset: entry.entry_offset,
        entry_address: entry.entry_address(),
    })
}

fn report_failure(path: &Path, err: &anyhow::Error) {
    eprintln!("{} {}: {err:#}", "error:".red().bold(), path.display());
}

fn show_entries(paths: &[PathBuf]) -> usize {
    let mut failed = 0;
    for path in paths {
        match inspect(path) {
            Ok(report) => {
                println!("{}", report.path.bold());
                println!("  Format:       {}", report.format);
                println!("  Load address: 0x{:x}", report.load_address);
                println!("  Entry offset: 0x{:x}", report.entry_offset);
                println!("  Entry VA:     0x{:x}", report.entry_address);
            }
            Err(err) => {
                report_failure(path, &err);
                failed += 1;
            }
        }
    }
    failed
}

fn show_formats(paths: &[PathBuf]) -> usize {
    let mut failed = 0;
    for path in paths {
        let detected = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|data| Ok(Format::detect(&data)?));
        match detected {
            Ok(format) => println!("{}: {}", path.display(), format.name().green()),
            Err(err) => {
                report_failure(path, &err);
                failed += 1;
            }
        }
    }
    failed
}

fn show_info(paths: &[PathBuf], json: bool) -> Result<usize> {
    let mut reports = Vec::new();
    let mut failed = 0;
    for path in paths {
        match inspect(path) {
            Ok(report) => reports.push(report),
            Err(err) => {
                report_failure(path, &err);
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if !reports.is_empty() {
        let mut table = Table::new(reports.iter().map(Row::from));
        table.with(Style::sharp());
        println!("{table}");
    }
    Ok(failed)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let failed = match cli.command {
        Command::Entry { paths } => show_entries(&paths),
        Command::Format { paths } => show_formats(&paths),
        Command::Info { paths, json } => show_info(&paths, json)?,
    };

    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be resolved");
    }
    Ok(())
}
