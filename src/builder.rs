//! Whole-tree database builder.
//!
//! Walks the root directory deterministically (lexicographic per level),
//! runs the per-file pipeline (decode, tokenize, interpret, assemble) on a
//! rayon worker pool, and merges the append-only results into one
//! [`Database`]. Per-file processing shares no mutable state, so the build
//! is embarrassingly parallel; the final ordering is re-sorted after
//! collection and never depends on completion order. Repeated builds over
//! an unchanged tree serialize byte-identically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::assemble::assemble;
use crate::classify::classify;
use crate::db::Database;
use crate::defect::{BuildError, Defect, DefectKind};
use crate::model::Keyword;
use crate::tokenize::{decode, tokenize};

/// Definition-file suffix, matched case-insensitively.
const DEFINITION_SUFFIX: &str = "cfg";

struct FileOutcome {
    keyword: Option<Keyword>,
    defects: Vec<Defect>,
}

/// Build the keyword database for a definition tree.
///
/// The only hard failure is a missing or unreadable root; every per-file
/// problem is collected into the database's defect list instead.
pub fn build(root: &Path) -> Result<Database, BuildError> {
    let never = AtomicBool::new(false);
    build_with_cancel(root, &never)
}

/// Build with cooperative cancellation: the flag is checked before each
/// file, a file already in flight runs to completion, and results for
/// completed files are retained in the partial database.
pub fn build_with_cancel(root: &Path, cancel: &AtomicBool) -> Result<Database, BuildError> {
    if !root.is_dir() {
        return Err(BuildError::RootNotFound(root.display().to_string()));
    }
    let files = collect_definition_files(root)?;

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .filter_map(|path| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(process_file(root, path))
        })
        .collect();

    Ok(aggregate(outcomes))
}

/// Recursive lexicographic walk collecting definition files. Only the root
/// itself being unreadable is a hard error; an unreadable descendant
/// directory is skipped.
fn collect_definition_files(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    fs::read_dir(root).map_err(|e| BuildError::RootUnreadable(root.display().to_string(), e))?;

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        let mut names: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        names.sort();
        for path in names {
            if path.is_dir() {
                pending.push(path);
            } else if has_definition_suffix(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_definition_suffix(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(DEFINITION_SUFFIX))
        .unwrap_or(false)
}

/// The per-file pipeline. Never fails: everything that goes wrong becomes
/// a defect against the file's path.
fn process_file(root: &Path, path: &Path) -> FileOutcome {
    let full = path.to_string_lossy().replace('\\', "/");
    let relative = relative_path(root, path);

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            return FileOutcome {
                keyword: None,
                defects: vec![Defect::new(
                    DefectKind::DecodeFailure,
                    relative,
                    format!("file unreadable: {}", error),
                )],
            }
        }
    };

    let text = match decode(&bytes) {
        Ok(text) => text,
        Err(message) => {
            return FileOutcome {
                keyword: None,
                defects: vec![Defect::new(DefectKind::DecodeFailure, relative, message)],
            }
        }
    };

    // Classification sees the full path so dialect markers in the root
    // directory name still count; provenance stays relative.
    let classification = classify(&full);
    let (sections, mut defects) = tokenize(&text, &relative);
    let (keyword, mut assembly_defects) = assemble(&relative, &sections, &classification);
    defects.append(&mut assembly_defects);

    FileOutcome {
        keyword: Some(keyword),
        defects,
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Merge per-file outcomes into one database with deterministic ordering.
fn aggregate(outcomes: Vec<FileOutcome>) -> Database {
    let mut keywords = Vec::new();
    let mut defects = Vec::new();
    for outcome in outcomes {
        keywords.extend(outcome.keyword);
        defects.extend(outcome.defects);
    }

    keywords.sort_by(|a: &Keyword, b: &Keyword| a.source_path.cmp(&b.source_path));
    keywords.dedup_by(|a, b| a.source_path == b.source_path);

    defects.extend(collision_notes(&keywords));
    defects.sort_by(|a, b| {
        (&a.source_path, a.line.unwrap_or(0), &a.message)
            .cmp(&(&b.source_path, b.line.unwrap_or(0), &b.message))
    });

    let mut by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut by_dialect: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for keyword in &keywords {
        by_category
            .entry(keyword.category.clone())
            .or_default()
            .push(keyword.source_path.clone());
        by_dialect
            .entry(keyword.dialect.tag().to_string())
            .or_default()
            .push(keyword.source_path.clone());
    }

    Database {
        keywords,
        defects,
        by_category,
        by_dialect,
    }
}

/// One collision note per `(dialect, name)` group with more than one
/// member. Disambiguation is a presentation concern; both entries stay in
/// the keyword set.
fn collision_notes(keywords: &[Keyword]) -> Vec<Defect> {
    let mut groups: BTreeMap<(String, String), Vec<&str>> = BTreeMap::new();
    for keyword in keywords {
        groups
            .entry((keyword.dialect.tag().to_string(), keyword.name.clone()))
            .or_default()
            .push(&keyword.source_path);
    }

    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|((dialect, name), paths)| {
            Defect::new(
                DefectKind::IdentityCollision,
                paths[0].to_string(),
                format!(
                    "keyword `{}` ({}) defined by multiple files: {}",
                    name,
                    dialect,
                    paths.join(", ")
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_a_hard_error() {
        let err = build(Path::new("/nonexistent/definition/tree")).unwrap_err();
        assert!(matches!(err, BuildError::RootNotFound(_)));
    }

    #[test]
    fn suffix_match_is_case_insensitive() {
        assert!(has_definition_suffix(Path::new("a/mat42.cfg")));
        assert!(has_definition_suffix(Path::new("a/mat42.CFG")));
        assert!(!has_definition_suffix(Path::new("a/readme.txt")));
        assert!(!has_definition_suffix(Path::new("a/cfg")));
    }

    #[test]
    fn collision_notes_group_by_dialect_and_name() {
        use crate::model::Dialect;
        let mk = |path: &str| {
            let mut k = crate::assemble::assemble(
                path,
                &[],
                &crate::classify::classify("CFG_Openradioss/radioss2023/x.cfg"),
            )
            .0;
            k.name = "MAT_LAW42".to_string();
            k.dialect = Dialect::Radioss;
            k
        };
        let keywords = vec![mk("a/mat42.cfg"), mk("b/mat42.cfg")];
        let notes = collision_notes(&keywords);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, DefectKind::IdentityCollision);
        assert!(notes[0].message.contains("a/mat42.cfg"));
        assert!(notes[0].message.contains("b/mat42.cfg"));
    }
}
