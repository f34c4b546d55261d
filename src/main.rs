//! jstyle CLI binary entry point.
//! Parses arguments, loads configuration, runs the checker or fixer, and
//! maps the outcome to exit codes 0/1/2.

mod cli;
mod config;
mod diagnostics;
mod engine;
mod error;
mod fixer;
mod lexer;
mod output;
mod rules;
mod runner;

use clap::Parser;
use cli::{Cli, Commands};
use runner::RunOptions;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    let (paths, config_path, format, rule, fail_fast, fix) = match cli.cmd {
        Commands::Check {
            paths,
            config,
            format,
            rule,
            fail_fast,
        } => (paths, config, format, rule, fail_fast, false),
        Commands::Fix {
            paths,
            config,
            format,
            rule,
            fail_fast,
        } => (paths, config, format, rule, fail_fast, true),
    };

    let format = format.unwrap_or_else(|| "text".to_string());
    if format != "text" && format != "json" {
        eprintln!(
            "{} unknown output format '{}' (expected text or json)",
            output::error_prefix(),
            format
        );
        std::process::exit(2);
    }

    let rules = rules::all();
    let known = engine::known_rules(&rules);

    // Unknown rule ids on the command line fail before any file is read,
    // same as unknown ids in the config file.
    for id in &rule {
        if engine::rule_by_id(&rules, id).is_none() {
            eprintln!("{} {}", output::error_prefix(), error::Error::UnknownRule(id.clone()));
            std::process::exit(2);
        }
    }

    let config = match config::load(config_path.as_deref().map(Path::new), &known) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", output::error_prefix(), e);
            std::process::exit(2);
        }
    };

    let files = match runner::expand_paths(&paths) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{} {}", output::error_prefix(), e);
            std::process::exit(2);
        }
    };
    if files.is_empty() {
        eprintln!("{} no input files matched", output::error_prefix());
        std::process::exit(2);
    }

    let options = RunOptions {
        fix,
        only: rule,
        fail_fast,
    };
    let report = runner::run(&files, &config, &rules, &options);
    output::print_report(&report, &format);
    std::process::exit(report.exit_code());
}
