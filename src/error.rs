//! Error taxonomy shared across the pipeline.
//!
//! Per-file failures (`Lex`, `Io`, `FixConflict`, `FixerNonConvergence`)
//! never abort a multi-file run unless `--fail-fast` is set. Configuration
//! errors are raised before any file work starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed source; fatal for the file that produced it.
    #[error("lex error at {line}:{column}: {message}")]
    Lex {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unknown top-level configuration key.
    #[error("unknown configuration key: {0}")]
    UnknownConfigKey(String),

    /// Configuration names a rule id the registry does not know.
    #[error("unknown rule id in configuration: {0}")]
    UnknownRule(String),

    /// Configuration sets an option the rule does not recognize.
    #[error("unknown option '{key}' for rule '{rule}'")]
    UnknownRuleOption { rule: String, key: String },

    /// Configuration file could not be parsed at all.
    #[error("invalid configuration: {0}")]
    ConfigParse(String),

    /// Two fixes in one pass touch intersecting byte ranges.
    #[error("conflicting fixes: byte ranges {a_start}..{a_end} and {b_start}..{b_end} overlap")]
    FixConflict {
        a_start: usize,
        a_end: usize,
        b_start: usize,
        b_end: usize,
    },

    /// A fix pass left fixable violations behind after the verification pass.
    #[error("fixes did not converge: {remaining} fixable violation(s) remain after one pass")]
    FixerNonConvergence { remaining: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for configuration errors, which abort the run before any file work.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::UnknownConfigKey(_)
                | Error::UnknownRule(_)
                | Error::UnknownRuleOption { .. }
                | Error::ConfigParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
