//! # cfgdb
//!
//! A parser and keyword-database builder for solver CFG definition files.
//!
//! A definition tree holds one file per keyword, organized into versioned,
//! solver-specific directories. `cfgdb` walks such a tree and produces a
//! normalized, queryable database of keyword definitions: parameters,
//! value kinds, physical dimensions, required/optional status, card
//! layout, and solver/version compatibility tags.
//!
//! The pipeline, per file:
//!
//! 1. [`classify`](classify::classify) — dialect and format tags from path
//!    segments alone (the trees carry no in-file format marker).
//! 2. [`tokenize`](tokenize::tokenize) — split decoded text into named
//!    sections with balanced-brace bodies.
//! 3. [`interpret`] — one interpreter per section kind, each yielding
//!    structured records plus diagnostics (partial success everywhere).
//! 4. [`assemble`](assemble::assemble) — merge the records into one
//!    [`Keyword`], resolving GUI and card-format cross-references.
//! 5. [`build`](builder::build) — the whole-tree walk, parallel per file,
//!    aggregated into a [`Database`] with a collected defect list.
//!
//! A bad file never aborts a build: decode failures, structural defects
//! and unresolved references are data in the database, not errors.

pub mod assemble;
pub mod builder;
pub mod classify;
pub mod db;
pub mod defect;
pub mod interpret;
pub mod model;
pub mod render;
pub mod tokenize;

pub use builder::{build, build_with_cancel};
pub use classify::{classify, Classification};
pub use db::Database;
pub use defect::{BuildError, Defect, DefectKind};
pub use model::{CardKind, CardLine, Dialect, Keyword, Parameter, ValueKind};
pub use render::{card_directives, render_card};
