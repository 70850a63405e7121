//! Defect taxonomy for the build pipeline.
//!
//! Everything here is collected, not thrown: a single bad file never aborts
//! a whole-tree build. Each defect carries the offending source path and
//! enough context (section, line) to locate it. The only hard failure of a
//! build is a caller-level contract violation, modeled by [`BuildError`].

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

/// What went wrong, coarsely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefectKind {
    /// File bytes unreadable under every tried encoding.
    DecodeFailure,
    /// Unbalanced section body or malformed section structure.
    StructuralDefect,
    /// One declaration line not matched by any pattern.
    DeclarationSkip,
    /// GUI or card-format reference to a nonexistent parameter.
    UnresolvedReference,
    /// Two files resolve to the same published identity.
    IdentityCollision,
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefectKind::DecodeFailure => "decode failure",
            DefectKind::StructuralDefect => "structural defect",
            DefectKind::DeclarationSkip => "declaration skip",
            DefectKind::UnresolvedReference => "unresolved reference",
            DefectKind::IdentityCollision => "identity collision",
        };
        write!(f, "{}", name)
    }
}

/// One recorded, non-fatal parsing anomaly attached to a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub kind: DefectKind,
    /// Relative path of the file the defect belongs to.
    pub source_path: String,
    /// Section the defect occurred in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 1-based line number within the file, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Defect {
    pub fn new(kind: DefectKind, source_path: impl Into<String>, message: impl Into<String>) -> Self {
        Defect {
            kind,
            source_path: source_path.into(),
            section: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source_path)?;
        if let Some(section) = &self.section {
            write!(f, " [{}]", section)?;
        }
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Hard failure of `build`: the root directory is missing or unreadable.
#[derive(Debug)]
pub enum BuildError {
    /// Root path does not exist or is not a directory.
    RootNotFound(String),
    /// Root exists but could not be read.
    RootUnreadable(String, io::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::RootNotFound(path) => {
                write!(f, "root directory not found: {}", path)
            }
            BuildError::RootUnreadable(path, err) => {
                write!(f, "root directory not readable: {}: {}", path, err)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::RootNotFound(_) => None,
            BuildError::RootUnreadable(_, err) => Some(err),
        }
    }
}
