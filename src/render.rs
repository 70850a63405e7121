//! Card rendering: re-emit a keyword's literal header/card templates.
//!
//! `render_card` produces the deck lines for one keyword with bound
//! parameter values substituted into the field specifiers positionally;
//! `card_directives` re-emits the format-section directive lines, which
//! the format interpreter can read back (the syntax-generator side of the
//! database). How bound values are sourced is the caller's concern.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{CardKind, Keyword};

static FIELD_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(-?)(\d*)(?:\.\d+)?[a-zA-Z]+").expect("field specifier pattern"));

/// Render the literal deck lines for `keyword` with `bound_values`
/// substituted by field position. Unbound fields render as blanks of the
/// field width. The header template is emitted first unless the card
/// format already carries a header line.
pub fn render_card(keyword: &Keyword, bound_values: &BTreeMap<String, String>) -> Vec<String> {
    let mut lines = Vec::new();

    let has_header_line = keyword
        .card_format
        .iter()
        .any(|l| l.kind == CardKind::Header);
    if !has_header_line {
        lines.push(keyword.header_template.clone());
    }

    for card in &keyword.card_format {
        match card.kind {
            CardKind::Header | CardKind::Comment => lines.push(card.template.clone()),
            CardKind::Data => lines.push(fill_template(
                &card.template,
                &card.bindings,
                bound_values,
            )),
        }
    }

    lines
}

/// Substitute bound values into a template's field specifiers, in order.
fn fill_template(
    template: &str,
    bindings: &[String],
    bound_values: &BTreeMap<String, String>,
) -> String {
    let mut output = String::new();
    let mut cursor = 0usize;

    for (index, caps) in FIELD_SPECIFIER.captures_iter(template).enumerate() {
        let whole = caps.get(0).expect("match group 0");
        output.push_str(&template[cursor..whole.start()]);
        cursor = whole.end();

        let value = bindings
            .get(index)
            .and_then(|name| bound_values.get(name))
            .map(String::as_str)
            .unwrap_or("");
        let left_align = !caps[1].is_empty();
        let width: usize = caps[2].parse().unwrap_or(0);
        if left_align {
            output.push_str(&format!("{:<width$}", value));
        } else {
            output.push_str(&format!("{:>width$}", value));
        }
    }
    output.push_str(&template[cursor..]);

    output
}

/// Re-emit the format-section directives for a keyword. Feeding the
/// result back through the format interpreter recovers the same line
/// kinds, templates and bound-parameter order.
pub fn card_directives(keyword: &Keyword) -> Vec<String> {
    keyword
        .card_format
        .iter()
        .map(|card| match card.kind {
            CardKind::Header => format!("HEADER(\"{}\");", card.template),
            CardKind::Comment => format!("COMMENT(\"{}\");", card.template),
            CardKind::Data => {
                if card.template.is_empty() && card.bindings.is_empty() {
                    "BLANK;".to_string()
                } else if card.bindings.is_empty() {
                    format!("CARD(\"{}\");", card.template)
                } else {
                    format!("CARD(\"{}\", {});", card.template, card.bindings.join(", "))
                }
            }
        })
        .collect()
}
