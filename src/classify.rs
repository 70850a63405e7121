//! Path classification: dialect, format tags and solver compatibility from
//! path segments alone.
//!
//! Definition trees carry no in-file format marker, so classification is a
//! prioritized pattern-match over path segments: an ordered rule list
//! evaluated top to bottom, first match wins. The classifier is a pure
//! function of the path string and never reads file content. Ambiguous
//! paths that match more than one rule deliberately use list order, not
//! "most specific", so results stay deterministic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Dialect;

/// Tag attached to paths matching no dialect rule.
pub const GENERIC_TAG: &str = "GENERIC";

/// Result of classifying one definition-file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub dialect: Dialect,
    /// Ordered most-specific first: `[DIALECT_VER, DIALECT, family aliases]`.
    pub format_tags: Vec<String>,
    /// Subset of `format_tags` interchangeable for cross-solver matching;
    /// purely cosmetic aliases are excluded.
    pub solver_compatibility: Vec<String>,
    /// Version string derived from a path segment, when one was found.
    pub version: Option<String>,
}

/// One classification rule: a segment predicate and the dialect it tags.
struct Rule {
    dialect: Dialect,
    matches: fn(&[&str]) -> bool,
}

/// Rule list in priority order. First match wins; order is the tie-break
/// policy for paths carrying more than one dialect marker (nested legacy
/// layouts do occur).
const RULES: &[Rule] = &[
    Rule {
        dialect: Dialect::LsDyna,
        matches: has_card_keyword_marker,
    },
    Rule {
        dialect: Dialect::Radioss,
        matches: has_radioss_marker,
    },
];

/// The LS-DYNA trees are identified by a directory literally named after
/// the card-keyword mechanism, e.g. `Keyword971`.
fn has_card_keyword_marker(segments: &[&str]) -> bool {
    segments
        .iter()
        .any(|s| s.to_ascii_lowercase().starts_with("keyword"))
}

fn has_radioss_marker(segments: &[&str]) -> bool {
    segments
        .iter()
        .any(|s| s.to_ascii_lowercase().contains("radioss"))
}

/// A path segment that is nothing but a version number, with an optional
/// `R`/`V` prefix: `2023`, `R11.1`, `v14`.
static VERSION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[RrVv]?(\d+(?:\.\d+)*)$").expect("version segment pattern"));

/// Trailing version digits on a marker segment: `radioss2023`, `Keyword971`.
static TRAILING_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)*)$").expect("trailing version pattern"));

/// Classify one definition-file path. Pure function of the path string.
pub fn classify(path: &str) -> Classification {
    let segments = split_segments(path);

    for rule in RULES {
        if (rule.matches)(&segments) {
            let version = derive_version(&segments);
            return tagged(rule.dialect, version);
        }
    }

    Classification {
        dialect: Dialect::Unknown,
        format_tags: vec![GENERIC_TAG.to_string()],
        solver_compatibility: vec![GENERIC_TAG.to_string()],
        version: None,
    }
}

/// Coarse category for a path: the first segment whose uppercase form is in
/// the fixed category vocabulary, title-cased; `General` otherwise.
pub fn category_of(path: &str) -> String {
    const CATEGORIES: &[&str] = &[
        "MAT",
        "PROP",
        "LOADS",
        "CARDS",
        "INTER",
        "FAIL",
        "DAMP",
        "SENSOR",
        "TABLE",
        "OUTPUTBLOCK",
        "RBODY",
        "TRANSFORM",
    ];

    for segment in split_segments(path) {
        let upper = segment.to_ascii_uppercase();
        if CATEGORIES.contains(&upper.as_str()) {
            return title_case(&upper.replace('_', " "));
        }
    }
    "General".to_string()
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Version suffix derivation: a standalone version-numbered segment wins;
/// otherwise trailing digits on a dialect-marker segment.
fn derive_version(segments: &[&str]) -> Option<String> {
    for segment in segments {
        if let Some(caps) = VERSION_SEGMENT.captures(segment) {
            return Some(caps[1].to_string());
        }
    }
    for segment in segments {
        let lower = segment.to_ascii_lowercase();
        if lower.contains("radioss") || lower.starts_with("keyword") {
            if let Some(caps) = TRAILING_VERSION.captures(segment) {
                return Some(caps[1].to_string());
            }
        }
    }
    None
}

fn tagged(dialect: Dialect, version: Option<String>) -> Classification {
    let dialect_tag = dialect.tag().to_string();
    let mut format_tags = Vec::new();
    if let Some(v) = &version {
        format_tags.push(format!("{}_{}", dialect_tag, v));
    }
    format_tags.push(dialect_tag.clone());

    // Family aliases, least specific last. OPENRADIOSS is a real
    // compatibility name; KEYWORD971 only ever names the directory layout.
    let mut solver_compatibility = format_tags.clone();
    match dialect {
        Dialect::Radioss => {
            format_tags.push("OPENRADIOSS".to_string());
            solver_compatibility.push("OPENRADIOSS".to_string());
        }
        Dialect::LsDyna => {
            format_tags.push("KEYWORD971".to_string());
        }
        Dialect::Unknown => {}
    }

    Classification {
        dialect,
        format_tags,
        solver_compatibility,
        version,
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("CFG_Openradioss/radioss2023/MAT/mat42.cfg", Dialect::Radioss, Some("2023"))]
    #[case("cfg/RADIOSS/2022.1/fail/johnson.cfg", Dialect::Radioss, Some("2022.1"))]
    #[case("dyna/Keyword971/MAT/mat_elastic.cfg", Dialect::LsDyna, Some("971"))]
    #[case("dyna/KEYWORD971_R11.1/prop/shell.cfg", Dialect::LsDyna, Some("11.1"))]
    #[case("misc/unsorted/thing.cfg", Dialect::Unknown, None)]
    fn classifies_known_layouts(
        #[case] path: &str,
        #[case] dialect: Dialect,
        #[case] version: Option<&str>,
    ) {
        let c = classify(path);
        assert_eq!(c.dialect, dialect);
        assert_eq!(c.version.as_deref(), version);
    }

    #[test]
    fn mixed_case_markers_match() {
        assert_eq!(classify("a/OpenRADIOSS/b.cfg").dialect, Dialect::Radioss);
        assert_eq!(classify("a/keyword971/b.cfg").dialect, Dialect::LsDyna);
    }

    #[test]
    fn card_keyword_rule_outranks_radioss_rule() {
        // A nested legacy layout carrying both markers: first rule wins.
        let c = classify("radioss_tree/Keyword971/mat/m1.cfg");
        assert_eq!(c.dialect, Dialect::LsDyna);
    }

    #[test]
    fn format_tags_ordered_most_specific_first() {
        let c = classify("CFG_Openradioss/radioss2023/MAT/mat42.cfg");
        assert_eq!(
            c.format_tags,
            vec!["RADIOSS_2023", "RADIOSS", "OPENRADIOSS"]
        );
        assert_eq!(
            c.solver_compatibility,
            vec!["RADIOSS_2023", "RADIOSS", "OPENRADIOSS"]
        );
    }

    #[test]
    fn cosmetic_alias_excluded_from_compatibility() {
        let c = classify("dyna/Keyword971/mat/m1.cfg");
        assert!(c.format_tags.contains(&"KEYWORD971".to_string()));
        assert!(!c.solver_compatibility.contains(&"KEYWORD971".to_string()));
    }

    #[test]
    fn unknown_paths_get_single_generic_tag() {
        let c = classify("somewhere/else/file.cfg");
        assert_eq!(c.dialect, Dialect::Unknown);
        assert_eq!(c.format_tags, vec![GENERIC_TAG]);
    }

    #[rstest]
    #[case("cfg/radioss2023/MAT/mat42.cfg", "Mat")]
    #[case("cfg/radioss2023/OUTPUTBLOCK/ob.cfg", "Outputblock")]
    #[case("cfg/radioss2023/engine/run.cfg", "General")]
    fn categories_from_path_vocabulary(#[case] path: &str, #[case] category: &str) {
        assert_eq!(category_of(path), category);
    }

    proptest! {
        // classify is a pure function: same input, same output, no panic.
        #[test]
        fn classify_is_deterministic(path in "\\PC{0,80}") {
            let first = classify(&path);
            let second = classify(&path);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn format_tags_never_empty(path in "\\PC{0,80}") {
            prop_assert!(!classify(&path).format_tags.is_empty());
        }
    }
}
