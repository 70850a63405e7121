//! Decoding and section tokenization for one definition file.
//!
//! A definition file is a sequence of named sections, each a keyword from a
//! fixed vocabulary, an optional parenthesized qualifier, and a balanced
//! `{ ... }` body:
//!
//! ```text
//! ATTRIBUTES(COMMON) {
//!     RHO = VALUE(FLOAT, "Initial density");
//! }
//! FORMAT(radioss2023) {
//!     CARD("%10d%20lg", PID, RHO);
//! }
//! ```
//!
//! The tokenizer finds section openers with a single anchored pattern and
//! then extracts the balanced body with a logos scanner. Braces inside
//! `//` line comments and inside quoted string literals do not contribute
//! to delimiter balance. A body left unbalanced at end of file is a
//! structural defect for that section only; the other sections of the file
//! are still produced.

use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defect::{Defect, DefectKind};

/// The fixed vocabulary of top-level section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Attribute declarations: parameter names, kinds, descriptions.
    Attributes,
    /// GUI/validation rules: mandatory and optional blocks, dimensions.
    Gui,
    /// Card-format templates for deck emission.
    Format,
    /// Internal keyword-identifier mappings.
    Identifiers,
    /// Literal default values per parameter.
    Defaults,
    /// Auxiliary definitions (`DATA_NAMES` lists).
    Definitions,
}

impl SectionKind {
    fn from_opener(word: &str) -> Option<SectionKind> {
        match word {
            "ATTRIBUTES" => Some(SectionKind::Attributes),
            "GUI" => Some(SectionKind::Gui),
            "FORMAT" => Some(SectionKind::Format),
            "SKEYWORDS_IDENTIFIER" => Some(SectionKind::Identifiers),
            "DEFAULTS" => Some(SectionKind::Defaults),
            "DEFINITIONS" => Some(SectionKind::Definitions),
            _ => None,
        }
    }

    /// The opener keyword as it appears in source.
    pub fn opener(&self) -> &'static str {
        match self {
            SectionKind::Attributes => "ATTRIBUTES",
            SectionKind::Gui => "GUI",
            SectionKind::Format => "FORMAT",
            SectionKind::Identifiers => "SKEYWORDS_IDENTIFIER",
            SectionKind::Defaults => "DEFAULTS",
            SectionKind::Definitions => "DEFINITIONS",
        }
    }
}

/// One tokenized section: kind, opener qualifier and raw body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    /// The opener's parenthesized parameter, e.g. which dialect version a
    /// format block targets. Empty qualifiers are reported as `None`.
    pub qualifier: Option<String>,
    /// Raw body text between the balanced braces.
    pub body: String,
    /// 1-based line of the section opener.
    pub opener_line: usize,
    /// 1-based line the body text starts on.
    pub body_line: usize,
}

/// Raw lexeme classes for the balanced-body scanner. Comments and string
/// literals are single opaque tokens so their braces never count toward
/// delimiter balance.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    StringLit,
    #[token("\n")]
    Newline,
    #[token("/")]
    Slash,
    #[token("\"")]
    StrayQuote,
    #[regex(r#"[^{}"/\n]+"#)]
    Text,
}

/// Decode file bytes, trying a short ordered list of encodings and
/// accepting the first that decodes cleanly: UTF-16 when a BOM says so,
/// strict UTF-8, then windows-1252. Single-byte decoding never fails on
/// its own, so decoded text containing control bytes other than
/// tab/newline/CR is rejected as binary.
pub fn decode(bytes: &[u8]) -> Result<String, String> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        let encoding = if bytes[0] == 0xFF {
            encoding_rs::UTF_16LE
        } else {
            encoding_rs::UTF_16BE
        };
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors && is_text(&text) {
            return Ok(text.into_owned());
        }
        return Err("UTF-16 stream contains invalid sequences".to_string());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        let text = text.trim_start_matches('\u{FEFF}');
        if is_text(text) {
            return Ok(text.to_string());
        }
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    if is_text(&text) {
        return Ok(text.into_owned());
    }
    Err("bytes do not decode as UTF-8, UTF-16 or windows-1252 text".to_string())
}

fn is_text(text: &str) -> bool {
    !text
        .chars()
        .any(|c| c.is_control() && c != '\t' && c != '\n' && c != '\r')
}

static SECTION_OPENER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(ATTRIBUTES|GUI|FORMAT|SKEYWORDS_IDENTIFIER|DEFAULTS|DEFINITIONS)\s*(?:\(\s*([^)]*?)\s*\))?\s*\{",
    )
    .expect("section opener pattern")
});

/// Split decoded file text into its top-level sections.
///
/// Structural defects (unbalanced bodies) are collected against
/// `source_path`; they never abort tokenization of the rest of the file.
pub fn tokenize(text: &str, source_path: &str) -> (Vec<Section>, Vec<Defect>) {
    let mut sections = Vec::new();
    let mut defects = Vec::new();
    let mut cursor = 0usize;

    for caps in SECTION_OPENER.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0");
        if whole.start() < cursor {
            // Opener text inside a previously extracted body.
            continue;
        }
        let kind = match SectionKind::from_opener(&caps[1]) {
            Some(kind) => kind,
            None => continue,
        };
        let qualifier = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|q| !q.is_empty());
        let body_start = whole.end();
        let opener_line = line_of(text, whole.start());
        let body_line = line_of(text, body_start);

        match find_balanced_end(&text[body_start..]) {
            Some(close_offset) => {
                let body = text[body_start..body_start + close_offset].to_string();
                cursor = body_start + close_offset + 1;
                sections.push(Section {
                    kind,
                    qualifier,
                    body,
                    opener_line,
                    body_line,
                });
            }
            None => {
                defects.push(
                    Defect::new(
                        DefectKind::StructuralDefect,
                        source_path,
                        "section body unbalanced at end of file",
                    )
                    .in_section(kind.opener())
                    .at_line(opener_line),
                );
                // Let nested openers inside the runaway body still be found.
                cursor = body_start;
            }
        }
    }

    (sections, defects)
}

/// Offset of the `}` that closes a body whose `{` was just consumed, or
/// `None` when the text runs out first. Comment and string tokens are
/// opaque to the balance count.
fn find_balanced_end(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut lexer = RawToken::lexer(text);
    while let Some(token) = lexer.next() {
        match token {
            Ok(RawToken::OpenBrace) => depth += 1,
            Ok(RawToken::CloseBrace) => {
                depth -= 1;
                if depth == 0 {
                    return Some(lexer.span().start);
                }
            }
            // Unknown byte sequences are opaque, like comments and strings.
            _ => {}
        }
    }
    None
}

fn line_of(text: &str, offset: usize) -> usize {
    1 + text[..offset].bytes().filter(|&b| b == b'\n').count()
}
