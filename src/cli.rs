//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jstyle",
    version,
    about = "Style checker and fixer for JavaScript sources",
    long_about = "jstyle — a fast CLI that checks JavaScript sources against a configurable style guide and applies safe automatic fixes.\n\nConfiguration precedence: CLI > jstyle.toml/yaml > defaults.",
    after_help = "Examples:\n  jstyle check src/\n  jstyle check src/app.js --format json\n  jstyle check 'src/**/*.js' --rule operator-spacing --rule strict-equality\n  jstyle fix src/ --config jstyle.toml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for checking and fixing.
pub enum Commands {
    /// Check files and report style violations
    #[command(
        about = "Check files and report violations",
        long_about = "Lex and check every input file against the enabled rules. Exits 0 when clean, 1 when violations are found, 2 on errors.",
        after_help = "Examples:\n  jstyle check src/\n  jstyle check src/app.js --format json --rule indentation"
    )]
    Check {
        #[arg(required = true, help = "Files, directories, or glob patterns")]
        paths: Vec<String>,
        #[arg(long, help = "Path to a jstyle.toml or jstyle.yaml config file")]
        config: Option<String>,
        #[arg(long, help = "Output format: text|json (default: text)")]
        format: Option<String>,
        #[arg(long = "rule", help = "Run only this rule id (repeatable)")]
        rule: Vec<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Stop at the first file that fails")]
        fail_fast: bool,
    },
    /// Apply automatic fixes in place, then report what remains
    #[command(
        about = "Fix files in place",
        long_about = "Apply every safe automatic fix, re-check the result, and report remaining violations. A pre-fix copy is kept as <file>.orig when fixing does not fully converge.",
        after_help = "Examples:\n  jstyle fix src/\n  jstyle fix src/app.js --rule primitive-literals"
    )]
    Fix {
        #[arg(required = true, help = "Files, directories, or glob patterns")]
        paths: Vec<String>,
        #[arg(long, help = "Path to a jstyle.toml or jstyle.yaml config file")]
        config: Option<String>,
        #[arg(long, help = "Output format: text|json (default: text)")]
        format: Option<String>,
        #[arg(long = "rule", help = "Run only this rule id (repeatable)")]
        rule: Vec<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Stop at the first file that fails")]
        fail_fast: bool,
    },
}
