//! Open Syndrome case filtering CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use comfy_table::Table;
use osi_cli::logging::{LogConfig, LogFormat, init_logging};
use osi_cli::summary::{annotation_table, definitions_table, format_codes, overlap_table};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{open_store, run_fetch, run_filter, run_find, run_overlap, run_validate};

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run(&cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let store = open_store(&cli.store)?;
    let color = cli.color.color;
    match &cli.command {
        Command::Find(args) => {
            let names = run_find(&store, args)?;
            if names.is_empty() {
                println!("No definitions matching '{}' in {}", args.term, args.version);
            } else {
                print_table(definitions_table(&names), color);
            }
        }
        Command::Filter(args) => {
            let result = run_filter(&store, args)?;
            // Stdout may carry the CSV, so the report goes to stderr.
            let mut table = annotation_table(&result.counts, result.rows);
            style_table(&mut table, color, io::stderr().is_terminal());
            eprintln!("{table}");
            if let Some(path) = &result.output {
                eprintln!("Wrote {} rows to {}", result.written_rows, path.display());
            }
        }
        Command::Overlap(args) => {
            let summary = run_overlap(&store, args)?;
            println!(
                "Common codes ({}): {}",
                summary.common.len(),
                format_codes(&summary.common)
            );
            print_table(overlap_table(&summary), color);
        }
        Command::Fetch(args) => {
            let result = run_fetch(&store, args)?;
            if let Some(dir) = &result.definitions_dir {
                println!("Definitions: {}", dir.display());
            }
            if let Some((path, downloaded)) = &result.schema {
                let state = if *downloaded {
                    "downloaded"
                } else {
                    "already present"
                };
                println!("Schema: {} ({state})", path.display());
            }
        }
        Command::Validate(args) => {
            let result = run_validate(&store, args)?;
            if result.errors.is_empty() {
                println!(
                    "{} is valid against {}",
                    args.file.display(),
                    result.schema.display()
                );
            } else {
                for error in &result.errors {
                    eprintln!("  - {error}");
                }
                anyhow::bail!(
                    "{} failed validation with {} error(s)",
                    args.file.display(),
                    result.errors.len()
                );
            }
        }
    }
    Ok(())
}

fn print_table(mut table: Table, color: ColorChoice) {
    style_table(&mut table, color, io::stdout().is_terminal());
    println!("{table}");
}

fn style_table(table: &mut Table, color: ColorChoice, is_terminal: bool) {
    let styled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal,
    };
    if styled {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level(level)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_ansi(ansi)
        .with_log_file(cli.log_file.clone())
        .with_timestamps(cli.log_timestamps)
        .with_target(cli.log_target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_log_level_disables_env_filter() {
        let cli = Cli::parse_from([
            "osi",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-timestamps",
            "--log-target",
            "--color",
            "never",
            "find",
            "sari",
        ]);

        let config = log_config_from_cli(&cli);

        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.with_ansi);
        assert!(config.with_timestamps);
        assert!(config.with_target);
    }

    #[test]
    fn defaults_follow_rust_log_at_warn() {
        let cli = Cli::parse_from(["osi", "find", "sari"]);

        let config = log_config_from_cli(&cli);

        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(config.use_env_filter);
        assert!(!config.with_timestamps);
        assert!(!config.with_target);
        assert_eq!(config.log_file, None);
    }
}
