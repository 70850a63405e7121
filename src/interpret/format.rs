//! Format-section interpreter.
//!
//! A FORMAT body is a sequence of line directives emitted in declaration
//! order: `HEADER("...")` for the keyword line, `COMMENT("...")` for
//! column-label lines, `CARD("template", A, B, ...)` for data lines whose
//! `%`-style field specifiers bind to parameters positionally, and a bare
//! `BLANK` for an empty line. Line order is the emission order and is
//! preserved verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interpret::{is_noise_line, Diagnostic};
use crate::model::CardKind;

/// One interpreted format directive.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatLine {
    pub kind: CardKind,
    pub template: String,
    /// Bound parameter names in field order; empty for header/comment.
    pub bindings: Vec<String>,
    /// Number of `%` field specifiers in the template.
    pub specifier_count: usize,
    /// 1-based line within the section body.
    pub line: usize,
}

/// Ordered directive matchers, one per directive shape.
static MATCHERS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "header",
            Regex::new(r#"^HEADER\s*\(\s*"(?P<template>[^"]*)"\s*\)\s*;?\s*$"#)
                .expect("header matcher"),
        ),
        (
            "comment",
            Regex::new(r#"^COMMENT\s*\(\s*"(?P<template>[^"]*)"\s*\)\s*;?\s*$"#)
                .expect("comment matcher"),
        ),
        (
            "card",
            Regex::new(
                r#"^CARD\s*\(\s*"(?P<template>[^"]*)"\s*(?:,\s*(?P<args>[^)]*?))?\s*\)\s*;?\s*$"#,
            )
            .expect("card matcher"),
        ),
        (
            "blank",
            Regex::new(r"^BLANK\s*;?\s*$").expect("blank matcher"),
        ),
    ]
});

/// A `%` field specifier: optional flags/width/precision, then the
/// conversion letters (`%10d`, `%-20s`, `%20lg`).
static FIELD_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%-?\d*(?:\.\d+)?[a-zA-Z]+").expect("field specifier pattern"));

/// Count the field specifiers in a template.
pub fn specifier_count(template: &str) -> usize {
    FIELD_SPECIFIER.find_iter(template).count()
}

/// Interpret one FORMAT body, preserving declaration order.
pub fn interpret(body: &str) -> (Vec<FormatLine>, Vec<Diagnostic>) {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw_line) in body.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw_line.trim();
        if is_noise_line(trimmed) {
            continue;
        }

        match try_matchers(trimmed, line_no) {
            Some(format_line) => lines.push(format_line),
            None => diagnostics.push(Diagnostic::new(
                line_no,
                format!("format directive not matched by any pattern: `{}`", trimmed),
            )),
        }
    }

    (lines, diagnostics)
}

fn try_matchers(line: &str, line_no: usize) -> Option<FormatLine> {
    for (name, pattern) in MATCHERS.iter() {
        let caps = match pattern.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        let template = caps
            .name("template")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let (kind, bindings) = match *name {
            "header" => (CardKind::Header, Vec::new()),
            "comment" => (CardKind::Comment, Vec::new()),
            "card" => {
                let bindings = caps
                    .name("args")
                    .map(|args| {
                        args.as_str()
                            .split(',')
                            .map(|a| a.trim().to_string())
                            .filter(|a| !a.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();
                (CardKind::Data, bindings)
            }
            "blank" => (CardKind::Data, Vec::new()),
            _ => unreachable!("matcher table names"),
        };
        let specifier_count = specifier_count(&template);
        return Some(FormatLine {
            kind,
            template,
            bindings,
            specifier_count,
            line: line_no,
        });
    }
    None
}
