//! jstyle core library.
//!
//! This crate exposes programmatic APIs for checking and fixing JavaScript
//! sources against a configurable style guide.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Config discovery, parsing, and key validation.
//! - `lexer`: Tokenization of JavaScript source with exact positions.
//! - `engine`: The `Rule` trait and the per-file check runner.
//! - `rules`: The built-in rule set.
//! - `fixer`: Text edits, conflict detection, and fix verification.
//! - `runner`: Multi-file orchestration, parallelism, and in-place fixing.
//! - `diagnostics`: Violations, severities, and report summaries.
//! - `output`: Text/JSON printers.
//! - `error`: The error taxonomy shared by every layer.
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fixer;
pub mod lexer;
pub mod output;
pub mod rules;
pub mod runner;
