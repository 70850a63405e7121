//! Identifier-mapping, defaults and definitions interpreters.
//!
//! The SKEYWORDS_IDENTIFIER body maps internal names to declared names
//! (`NAME = VALUE;`), used only to resolve aliases; DEFAULTS bodies share
//! the same pair shape with literal values; DEFINITIONS bodies carry
//! `DATA_NAMES = (A, B, C)` lists.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interpret::{is_noise_line, Diagnostic};

/// One `name = value` pair with its 1-based body line.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub name: String,
    pub value: String,
    pub line: usize,
}

static PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<value>[^;]+?)\s*;?\s*$")
        .expect("pair pattern")
});

static DATA_NAMES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"DATA_NAMES\s*=\s*\(\s*(?P<names>[^)]*?)\s*\)").expect("data names pattern")
});

/// Interpret a pair-shaped body (identifier mappings, defaults).
pub fn interpret_pairs(body: &str) -> (Vec<Pair>, Vec<Diagnostic>) {
    let mut pairs = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw_line) in body.lines().enumerate() {
        let line_no = index + 1;
        // Inline comments do not belong to the value.
        let without_comment = raw_line.split("//").next().unwrap_or("");
        let trimmed = without_comment.trim();
        if is_noise_line(trimmed) {
            continue;
        }

        match PAIR.captures(trimmed) {
            Some(caps) => pairs.push(Pair {
                name: caps["name"].to_string(),
                value: caps["value"].to_string(),
                line: line_no,
            }),
            None => diagnostics.push(Diagnostic::new(
                line_no,
                format!("identifier pair not matched: `{}`", trimmed),
            )),
        }
    }

    (pairs, diagnostics)
}

/// Extract the `DATA_NAMES` list from a DEFINITIONS body, when present.
pub fn interpret_data_names(body: &str) -> Vec<String> {
    DATA_NAMES
        .captures(body)
        .map(|caps| {
            caps["names"]
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
