//! The assembled keyword database and its query surface.
//!
//! A [`Database`] is an independent value produced by one build pass:
//! the full per-file keyword set, the collected defect list, and
//! convenience indexes by category and by dialect. There is no process-wide
//! cache to invalidate; a fresh build is always a clean aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defect::Defect;
use crate::model::{Dialect, Keyword};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// All keywords, sorted by `source_path`.
    pub keywords: Vec<Keyword>,
    /// Per-file defects collected during the build, never thrown.
    pub defects: Vec<Defect>,
    /// Category name to source paths of its keywords.
    pub by_category: BTreeMap<String, Vec<String>>,
    /// Dialect tag to source paths of its keywords.
    pub by_dialect: BTreeMap<String, Vec<String>>,
}

impl Database {
    /// Look up a keyword by dialect and canonical name (aliases count).
    /// When several versions match, the most specific version tag wins.
    /// Unknown names return `None`, never a silent default.
    pub fn lookup(&self, dialect: Dialect, name: &str) -> Option<&Keyword> {
        self.keywords
            .iter()
            .filter(|k| {
                k.dialect == dialect
                    && (k.name == name || k.aliases.iter().any(|a| a == name))
            })
            .max_by_key(|k| version_rank(k))
    }

    /// The keyword originating from one source file.
    pub fn lookup_path(&self, source_path: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.source_path == source_path)
    }

    /// Number of keywords whose name starts with or contains `pattern`.
    pub fn count_matching(&self, pattern: &str) -> usize {
        let upper = pattern.to_ascii_uppercase();
        self.keywords
            .iter()
            .filter(|k| k.name.starts_with(&upper) || k.name.contains(&upper))
            .count()
    }

    /// Keywords whose name matches `pattern`, sorted by name.
    pub fn search(&self, pattern: &str) -> Vec<&Keyword> {
        let upper = pattern.to_ascii_uppercase();
        let mut found: Vec<&Keyword> = self
            .keywords
            .iter()
            .filter(|k| k.name.starts_with(&upper) || k.name.contains(&upper))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// All category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.by_category.keys().map(String::as_str).collect()
    }

    /// Keywords in one category, in database order.
    pub fn keywords_in_category<'a>(&'a self, category: &str) -> Vec<&'a Keyword> {
        self.keywords
            .iter()
            .filter(|k| k.category == category)
            .collect()
    }

    /// Serialize to JSON. Deterministic for a given database: keyword order
    /// is fixed by the builder and all maps are ordered.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Rank a keyword's version specificity for lookup disambiguation:
/// a version-qualified tag beats none, then numeric segments compare.
fn version_rank(keyword: &Keyword) -> (bool, Vec<u64>) {
    match version_of(keyword) {
        Some(version) => {
            let segments = version
                .split('.')
                .map(|s| s.parse::<u64>().unwrap_or(0))
                .collect();
            (true, segments)
        }
        None => (false, Vec::new()),
    }
}

/// The version suffix of the most specific format tag, when qualified.
pub(crate) fn version_of(keyword: &Keyword) -> Option<&str> {
    let prefix = format!("{}_", keyword.dialect.tag());
    keyword.primary_tag().strip_prefix(&prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CardLine, Parameter};

    fn keyword(name: &str, dialect: Dialect, tags: &[&str], path: &str) -> Keyword {
        Keyword {
            name: name.to_string(),
            aliases: Vec::new(),
            category: "Mat".to_string(),
            dialect,
            format_tags: tags.iter().map(|t| t.to_string()).collect(),
            solver_compatibility: tags.iter().map(|t| t.to_string()).collect(),
            source_path: path.to_string(),
            header_template: format!("*{}", name),
            parameters: Vec::<Parameter>::new(),
            card_format: Vec::<CardLine>::new(),
            identifiers: BTreeMap::new(),
            data_names: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    fn sample() -> Database {
        Database {
            keywords: vec![
                keyword(
                    "MAT_LAW42",
                    Dialect::Radioss,
                    &["RADIOSS_2022", "RADIOSS"],
                    "r2022/MAT/mat42.cfg",
                ),
                keyword(
                    "MAT_LAW42",
                    Dialect::Radioss,
                    &["RADIOSS_2023", "RADIOSS"],
                    "r2023/MAT/mat42.cfg",
                ),
                keyword(
                    "MAT_ELASTIC",
                    Dialect::LsDyna,
                    &["LS_DYNA_971", "LS_DYNA"],
                    "k971/MAT/mat_elastic.cfg",
                ),
            ],
            ..Database::default()
        }
    }

    #[test]
    fn lookup_prefers_most_specific_version() {
        let db = sample();
        let hit = db.lookup(Dialect::Radioss, "MAT_LAW42").unwrap();
        assert_eq!(hit.source_path, "r2023/MAT/mat42.cfg");
    }

    #[test]
    fn lookup_unknown_name_is_none() {
        let db = sample();
        assert!(db.lookup(Dialect::Radioss, "MAT_LAW999").is_none());
        assert!(db.lookup(Dialect::LsDyna, "MAT_LAW42").is_none());
    }

    #[test]
    fn count_and_search_match_by_prefix_and_substring() {
        let db = sample();
        assert_eq!(db.count_matching("MAT"), 3);
        assert_eq!(db.count_matching("ELASTIC"), 1);
        let names: Vec<_> = db.search("LAW42").iter().map(|k| k.name.clone()).collect();
        assert_eq!(names, vec!["MAT_LAW42", "MAT_LAW42"]);
    }

    #[test]
    fn version_suffix_extraction() {
        let db = sample();
        assert_eq!(version_of(&db.keywords[0]), Some("2022"));
        let mut unversioned = db.keywords[0].clone();
        unversioned.format_tags = vec!["RADIOSS".to_string()];
        assert_eq!(version_of(&unversioned), None);
    }
}
