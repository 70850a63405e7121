//! Core data model for the keyword database.
//!
//! One [`Keyword`] is produced per definition file during a build pass and is
//! immutable afterwards; rebuilding replaces the whole database. Parameter
//! order is declaration order and is semantically meaningful because card
//! formats reference parameters positionally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A solver keyword-definition language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    /// OpenRadioss block-format definitions.
    Radioss,
    /// LS-DYNA `Keyword971` card-keyword definitions.
    LsDyna,
    /// Path matched no known dialect marker; the file is still parsed.
    Unknown,
}

impl Dialect {
    /// Canonical tag string used in `format_tags` and serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            Dialect::Radioss => "RADIOSS",
            Dialect::LsDyna => "LS_DYNA",
            Dialect::Unknown => "UNKNOWN",
        }
    }

    /// Parse a tag string back into a dialect. Case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Dialect> {
        match tag.to_ascii_uppercase().as_str() {
            "RADIOSS" | "OPENRADIOSS" => Some(Dialect::Radioss),
            "LS_DYNA" | "LSDYNA" | "KEYWORD971" => Some(Dialect::LsDyna),
            "UNKNOWN" => Some(Dialect::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The declared value type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Float,
    String,
    /// Reference to a node entity.
    Node,
    /// Reference to a coordinate/unit system entity.
    System,
    /// A type word outside the known vocabulary, carried verbatim.
    Other(String),
    /// An array of one of the scalar kinds.
    Array(Box<ValueKind>),
}

impl ValueKind {
    /// Map a declared type word (`INT`, `FLOAT`, ...) to a kind.
    pub fn from_type_word(word: &str) -> ValueKind {
        match word.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => ValueKind::Int,
            "FLOAT" | "DOUBLE" => ValueKind::Float,
            "STRING" | "STR" => ValueKind::String,
            "NODE" => ValueKind::Node,
            "SYSTEM" => ValueKind::System,
            other => ValueKind::Other(other.to_string()),
        }
    }

    /// Whether this kind is an array kind.
    pub fn is_array(&self) -> bool {
        matches!(self, ValueKind::Array(_))
    }
}

/// One attribute declared for a keyword.
///
/// `name` is unique within its keyword's parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value_kind: ValueKind,
    /// Free text from the declaration; may be empty.
    pub description: String,
    /// Physical-dimension tag from the GUI section ("density", "pressure", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// True only when the parameter appears in a mandatory GUI block.
    pub required: bool,
    /// Declared array size, literal or symbolic. Present only for array kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_size: Option<String>,
}

/// Classification of one physical output line template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Keyword header line.
    Header,
    /// Comment line (column labels, separators).
    Comment,
    /// Data line with positional field specifiers.
    Data,
}

/// One physical line template of a keyword's card format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardLine {
    pub kind: CardKind,
    /// Literal template text with `%`-style field specifiers.
    pub template: String,
    /// Parameter names bound to the specifiers, in field order.
    /// Empty for header and comment lines.
    pub bindings: Vec<String>,
}

/// One keyword definition, assembled from a single source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Canonical identifier, uppercase, dialect prefix stripped.
    pub name: String,
    /// Additional keyword names declared by the same file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Coarse grouping derived from the file's path.
    pub category: String,
    pub dialect: Dialect,
    /// Ordered, most-specific first: version-qualified tag, dialect tag,
    /// family aliases. Never empty.
    pub format_tags: Vec<String>,
    /// Subset of `format_tags` considered interchangeable for matching.
    pub solver_compatibility: Vec<String>,
    /// Relative path of the originating file. Never mutated after creation.
    pub source_path: String,
    /// Literal syntax template used to emit this keyword's header line.
    pub header_template: String,
    /// Declaration order; card formats reference parameters positionally.
    pub parameters: Vec<Parameter>,
    pub card_format: Vec<CardLine>,
    /// Internal-name mappings from the identifier section. Alias resolution
    /// only; never merged into `parameters`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<String, String>,
    /// `DATA_NAMES` list from a definitions section, when present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_names: Vec<String>,
    /// Literal default-value strings keyed by parameter name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

impl Keyword {
    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up one parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The most specific format tag (first entry; never absent).
    pub fn primary_tag(&self) -> &str {
        self.format_tags
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.dialect.tag())
    }

    /// Published identity used for collision detection and lookup
    /// disambiguation: `(dialect, name, most-specific tag)`.
    pub fn identity(&self) -> (Dialect, &str, &str) {
        (self.dialect, &self.name, self.primary_tag())
    }
}
