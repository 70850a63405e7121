//! GUI-section interpreter.
//!
//! A GUI body classifies parameters into a `mandatory:` and an `optional:`
//! block, each a sequence of widget directives referencing a parameter by
//! name, optionally with inline attribute assignments:
//!
//! ```text
//! mandatory:
//!     SCALAR(RHO) { DIMENSION = "density"; }
//! optional:
//!     RADIO(ISMSTR) { ... }
//! ```
//!
//! The interpreter yields partial records (name, required, dimension) to
//! be merged onto the attribute interpreter's output; it never introduces
//! parameters of its own. The GUI body is also where a file declares its
//! emitted keyword string (`ASSIGN(KEYWORD_STR, "...")`) and header text
//! (`HEADER("...")`), both captured here verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interpret::Diagnostic;

/// One parameter reference found in a GUI block.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiEntry {
    pub name: String,
    /// True when the entry sits in a `mandatory:` block.
    pub required: bool,
    /// `DIMENSION = "..."` inline attribute, when present.
    pub dimension: Option<String>,
    /// 1-based line within the section body.
    pub line: usize,
}

/// Everything extracted from one GUI body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuiRecords {
    pub entries: Vec<GuiEntry>,
    /// Raw `ASSIGN(KEYWORD_STR, "...")` strings in declaration order.
    pub keyword_strings: Vec<String>,
    /// Raw `HEADER("...")` strings in declaration order.
    pub headers: Vec<String>,
}

static BLOCK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(mandatory|optional)\s*:").expect("block marker pattern"));

/// Widget directive with a parameter reference and optional inline
/// attribute braces. ASSIGN and HEADER are handled separately; any other
/// uppercase directive word counts as a widget.
static WIDGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)(?P<widget>[A-Z][A-Z_0-9]*)\s*\(\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*(?:,[^)]*)?\)\s*(?:\{(?P<attrs>[^}]*)\})?"#,
    )
    .expect("widget pattern")
});

static DIMENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"DIMENSION\s*=\s*"(?P<dim>[^"]*)""#).expect("dimension pattern"));

static ASSIGN_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"ASSIGN\s*\(\s*KEYWORD_STR\s*,\s*"(?P<value>[^"]*)"\s*\)"#)
        .expect("assign pattern")
});

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"HEADER\s*\(\s*"(?P<value>[^"]*)"\s*\)"#).expect("header pattern"));

/// Directive words that reference no parameter.
const NON_WIDGET_WORDS: &[&str] = &["ASSIGN", "HEADER", "SEPARATOR", "TITLE"];

/// Interpret one GUI body.
pub fn interpret(body: &str) -> (GuiRecords, Vec<Diagnostic>) {
    let mut records = GuiRecords::default();
    let mut diagnostics = Vec::new();

    for caps in ASSIGN_KEYWORD.captures_iter(body) {
        records.keyword_strings.push(caps["value"].to_string());
    }
    for caps in HEADER.captures_iter(body) {
        records.headers.push(caps["value"].to_string());
    }

    // Region boundaries: text before the first marker is unclassified and
    // therefore not required.
    let mut regions: Vec<(usize, usize, bool)> = Vec::new();
    let mut previous: Option<(usize, bool)> = None;
    for caps in BLOCK_MARKER.captures_iter(body) {
        let whole = caps.get(0).expect("match group 0");
        if let Some((start, required)) = previous.take() {
            regions.push((start, whole.start(), required));
        } else {
            regions.push((0, whole.start(), false));
        }
        previous = Some((whole.end(), &caps[1] == "mandatory"));
    }
    match previous {
        Some((start, required)) => regions.push((start, body.len(), required)),
        None => regions.push((0, body.len(), false)),
    }

    for (start, end, required) in regions {
        let region = &body[start..end];
        for caps in WIDGET.captures_iter(region) {
            let widget = &caps["widget"];
            if NON_WIDGET_WORDS.contains(&widget) {
                continue;
            }
            let offset = start + caps.get(0).expect("match group 0").start();
            let dimension = caps
                .name("attrs")
                .and_then(|attrs| DIMENSION.captures(attrs.as_str()))
                .map(|dim| dim["dim"].to_string());
            records.entries.push(GuiEntry {
                name: caps["name"].to_string(),
                required,
                dimension,
                line: line_within(body, offset),
            });
        }
    }

    // Unterminated directives are worth a note; everything else in a GUI
    // body is free-form enough to pass through silently.
    for (index, raw_line) in body.lines().enumerate() {
        let trimmed = raw_line.trim();
        if trimmed.contains('(') && !trimmed.contains(')') && WIDGET_START.is_match(trimmed) {
            diagnostics.push(Diagnostic::new(
                index + 1,
                format!("unterminated GUI directive: `{}`", trimmed),
            ));
        }
    }

    (records, diagnostics)
}

static WIDGET_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z_0-9]*\s*\($").expect("widget start pattern"));

fn line_within(body: &str, offset: usize) -> usize {
    1 + body[..offset].bytes().filter(|&b| b == b'\n').count()
}
