//! Attribute-section interpreter.
//!
//! An ATTRIBUTES body is a sequence of declarations of the shape
//! `NAME = KIND(TYPE, "description")`, with an optional `[size]` subscript
//! for array kinds and a `SIZE("description")` short form for counters.
//! Declarations across solver families are irregular, so each line is
//! tried against an ordered matcher table, most specific first, and the
//! first matching pattern wins. Lines no pattern matches are recorded as
//! skip diagnostics, never as errors.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interpret::{is_noise_line, Diagnostic};
use crate::model::ValueKind;

/// One parsed attribute declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub name: String,
    pub value_kind: ValueKind,
    pub description: String,
    /// Literal or symbolic array size; present only for array kinds.
    pub array_size: Option<String>,
    /// 1-based line within the section body.
    pub line: usize,
}

/// Ordered declaration matchers. Order matters: the subscripted shape must
/// be tried before the plain one, and the described shapes before the bare
/// ones, so the most informative pattern claims each line.
static MATCHERS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "array-with-description",
            Regex::new(
                r#"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<kind>[A-Z_]+)\s*\[\s*(?P<size>[^\]]+?)\s*\]\s*\(\s*(?P<ty>[A-Za-z_]+)\s*,\s*"(?P<desc>[^"]*)"\s*\)\s*;?\s*$"#,
            )
            .expect("array matcher"),
        ),
        (
            "value-with-description",
            Regex::new(
                r#"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<kind>[A-Z_]+)\s*\(\s*(?P<ty>[A-Za-z_]+)\s*,\s*"(?P<desc>[^"]*)"\s*\)\s*;?\s*$"#,
            )
            .expect("value matcher"),
        ),
        (
            "size-counter",
            Regex::new(
                r#"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*SIZE\s*\(\s*"(?P<desc>[^"]*)"\s*\)\s*;?\s*$"#,
            )
            .expect("size matcher"),
        ),
        (
            "bare-value",
            Regex::new(
                r#"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<kind>[A-Z_]+)\s*\(\s*(?P<ty>[A-Za-z_]+)\s*\)\s*;?\s*$"#,
            )
            .expect("bare matcher"),
        ),
    ]
});

/// Interpret one ATTRIBUTES body. Declaration order is preserved.
pub fn interpret(body: &str) -> (Vec<AttributeDecl>, Vec<Diagnostic>) {
    let mut decls = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw_line) in body.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw_line.trim();
        if is_noise_line(trimmed) {
            continue;
        }

        match try_matchers(trimmed, line_no) {
            Some(decl) => decls.push(decl),
            None => diagnostics.push(Diagnostic::new(
                line_no,
                format!("attribute declaration not matched by any pattern: `{}`", trimmed),
            )),
        }
    }

    (decls, diagnostics)
}

fn try_matchers(line: &str, line_no: usize) -> Option<AttributeDecl> {
    for (name, pattern) in MATCHERS.iter() {
        if let Some(caps) = pattern.captures(line) {
            return Some(build_decl(name, &caps, line_no));
        }
    }
    None
}

fn build_decl(matcher: &str, caps: &regex::Captures<'_>, line_no: usize) -> AttributeDecl {
    let name = caps["name"].to_string();
    let description = caps
        .name("desc")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    if matcher == "size-counter" {
        return AttributeDecl {
            name,
            value_kind: ValueKind::Int,
            description,
            array_size: None,
            line: line_no,
        };
    }

    let element = ValueKind::from_type_word(&caps["ty"]);
    let array_size = caps.name("size").map(|m| m.as_str().to_string());
    let value_kind = if array_size.is_some() || caps["kind"].eq_ignore_ascii_case("ARRAY") {
        ValueKind::Array(Box::new(element))
    } else {
        element
    };

    AttributeDecl {
        name,
        value_kind,
        description,
        array_size,
        line: line_no,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_declarations_in_order() {
        let body = r#"
            PID = VALUE(INT, "Part identifier");
            RHO = VALUE(FLOAT, "Initial density");
        "#;
        let (decls, diags) = interpret(body);
        assert!(diags.is_empty());
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "PID");
        assert_eq!(decls[0].value_kind, ValueKind::Int);
        assert_eq!(decls[1].name, "RHO");
        assert_eq!(decls[1].description, "Initial density");
    }

    #[test]
    fn array_declaration_with_symbolic_size() {
        let body = r#"TABLE_X = ARRAY[NPOINTS](FLOAT, "Abscissa values");"#;
        let (decls, diags) = interpret(body);
        assert!(diags.is_empty());
        assert_eq!(
            decls[0].value_kind,
            ValueKind::Array(Box::new(ValueKind::Float))
        );
        assert_eq!(decls[0].array_size.as_deref(), Some("NPOINTS"));
    }

    #[test]
    fn value_with_subscript_is_an_array_kind() {
        let body = r#"N = VALUE[3](NODE, "Node triplet");"#;
        let (decls, _) = interpret(body);
        assert_eq!(
            decls[0].value_kind,
            ValueKind::Array(Box::new(ValueKind::Node))
        );
        assert_eq!(decls[0].array_size.as_deref(), Some("3"));
    }

    #[test]
    fn size_counter_short_form() {
        let body = r#"NIP = SIZE("Number of integration points");"#;
        let (decls, diags) = interpret(body);
        assert!(diags.is_empty());
        assert_eq!(decls[0].value_kind, ValueKind::Int);
        assert_eq!(decls[0].description, "Number of integration points");
    }

    #[test]
    fn bare_declaration_without_description() {
        let body = "ISENSOR = VALUE(SENSOR)";
        let (decls, diags) = interpret(body);
        assert!(diags.is_empty());
        assert_eq!(
            decls[0].value_kind,
            ValueKind::Other("SENSOR".to_string())
        );
        assert_eq!(decls[0].description, "");
    }

    #[test]
    fn unmatched_lines_become_skip_diagnostics() {
        let body = "PID = VALUE(INT, \"ok\");\nwhat is this line\nRHO = VALUE(FLOAT, \"ok\");";
        let (decls, diags) = interpret(body);
        assert_eq!(decls.len(), 2);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let body = "// material block\n\nRHO = VALUE(FLOAT, \"density\");\n";
        let (decls, diags) = interpret(body);
        assert!(diags.is_empty());
        assert_eq!(decls.len(), 1);
    }
}
