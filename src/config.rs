//! Configuration discovery, parsing, and validation.
//!
//! jstyle reads `jstyle.toml|yaml|yml` from the working directory (or the
//! closest ancestor, stopping at a `.git` boundary) unless `--config` names
//! a file explicitly. Defaults:
//! - `indent_width`: 4
//! - `max_line_length`: 100
//! - `quote_style`: "single"
//! - `require_strict_mode_per_function`: true
//! - every rule enabled with empty options
//!
//! Unknown top-level keys, unknown rule ids under `[rules]`, and unknown
//! per-rule option keys are configuration errors naming the offending key;
//! they abort the run before any file is processed.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Preferred string quote character.
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn quote_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Per-rule settings under `[rules.<id>]`.
pub struct RuleCfg {
    pub enabled: bool,
    pub options: HashMap<String, Json>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration consumed by the engine and rules.
pub struct Config {
    pub indent_width: usize,
    pub max_line_length: usize,
    pub quote_style: QuoteStyle,
    pub require_strict_mode_per_function: bool,
    pub rules: HashMap<String, RuleCfg>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_width: 4,
            max_line_length: 100,
            quote_style: QuoteStyle::Single,
            require_strict_mode_per_function: true,
            rules: HashMap::new(),
        }
    }
}

impl Config {
    /// True unless the rule was explicitly disabled.
    pub fn rule_enabled(&self, id: &str) -> bool {
        self.rules.get(id).map(|r| r.enabled).unwrap_or(true)
    }

    pub fn rule_option(&self, id: &str, key: &str) -> Option<&Json> {
        self.rules.get(id)?.options.get(key)
    }

    pub fn rule_option_usize(&self, id: &str, key: &str, default: usize) -> usize {
        self.rule_option(id, key)
            .and_then(Json::as_u64)
            .map(|n| n as usize)
            .unwrap_or(default)
    }
}

/// `(rule id, recognized option keys)` pairs used to validate `[rules.*]`.
pub type KnownRules<'a> = &'a [(&'static str, &'static [&'static str])];

/// Walk upward from `start` to find a config file.
///
/// Stops at the first directory containing `jstyle.toml|yaml|yml` or a
/// `.git` directory (repository boundary).
pub fn discover(start: &Path) -> Option<PathBuf> {
    let mut cur = start;
    loop {
        for name in ["jstyle.toml", "jstyle.yaml", "jstyle.yml"] {
            let p = cur.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
        if cur.join(".git").exists() {
            return None;
        }
        cur = cur.parent()?;
    }
}

/// Load a config file (or defaults when `path` is `None` and nothing is
/// discovered from the current directory), validating keys against `known`.
pub fn load(path: Option<&Path>, known: KnownRules<'_>) -> Result<Config> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => discover(Path::new(".")),
    };
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = fs::read_to_string(&path)?;
    let value: Json = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
        serde_yaml::from_str(&raw).map_err(|e| Error::ConfigParse(e.to_string()))?
    } else {
        toml::from_str(&raw).map_err(|e| Error::ConfigParse(e.to_string()))?
    };
    from_value(value, known)
}

fn from_value(value: Json, known: KnownRules<'_>) -> Result<Config> {
    let Json::Object(table) = value else {
        return Err(Error::ConfigParse("expected a table at the top level".into()));
    };
    let mut cfg = Config::default();
    for (key, val) in table {
        match key.as_str() {
            "indent_width" => cfg.indent_width = expect_usize(&key, &val)?,
            "max_line_length" => cfg.max_line_length = expect_usize(&key, &val)?,
            "quote_style" => {
                cfg.quote_style = match val.as_str() {
                    Some("single") => QuoteStyle::Single,
                    Some("double") => QuoteStyle::Double,
                    _ => {
                        return Err(Error::ConfigParse(
                            "quote_style must be \"single\" or \"double\"".into(),
                        ));
                    }
                }
            }
            "require_strict_mode_per_function" => {
                cfg.require_strict_mode_per_function = val
                    .as_bool()
                    .ok_or_else(|| Error::ConfigParse(format!("{key} must be a boolean")))?;
            }
            "rules" => cfg.rules = parse_rules(val, known)?,
            _ => return Err(Error::UnknownConfigKey(key)),
        }
    }
    Ok(cfg)
}

fn expect_usize(key: &str, val: &Json) -> Result<usize> {
    val.as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| Error::ConfigParse(format!("{key} must be a non-negative integer")))
}

fn parse_rules(value: Json, known: KnownRules<'_>) -> Result<HashMap<String, RuleCfg>> {
    let Json::Object(table) = value else {
        return Err(Error::ConfigParse("rules must be a table of rule ids".into()));
    };
    let mut out = HashMap::new();
    for (id, body) in table {
        let Some((_, options)) = known.iter().find(|(rid, _)| *rid == id) else {
            return Err(Error::UnknownRule(id));
        };
        let Json::Object(body) = body else {
            return Err(Error::ConfigParse(format!("rules.{id} must be a table")));
        };
        let mut rc = RuleCfg {
            enabled: true,
            options: HashMap::new(),
        };
        for (key, val) in body {
            match key.as_str() {
                "enabled" => {
                    rc.enabled = val.as_bool().ok_or_else(|| {
                        Error::ConfigParse(format!("rules.{id}.enabled must be a boolean"))
                    })?;
                }
                "options" => {
                    let Json::Object(opts) = val else {
                        return Err(Error::ConfigParse(format!(
                            "rules.{id}.options must be a table"
                        )));
                    };
                    for (okey, oval) in opts {
                        if !options.contains(&okey.as_str()) {
                            return Err(Error::UnknownRuleOption {
                                rule: id.clone(),
                                key: okey,
                            });
                        }
                        rc.options.insert(okey, oval);
                    }
                }
                _ => return Err(Error::UnknownConfigKey(format!("rules.{id}.{key}"))),
            }
        }
        out.insert(id, rc);
    }
    Ok(out)
}
