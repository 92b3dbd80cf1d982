//! Error types for every stage of the ASN.1-to-dissector pipeline.

use smartstring::{LazyCompact, SmartString};
use thiserror::Error;

type CompactString = SmartString<LazyCompact>;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A source position, used to point at the offending text in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Top-level error type returned by the compiler pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Lexical error while tokenising ASN.1 source.
    #[error("lex error at {0}: {1}")]
    Lex(Position, CompactString),

    /// Grammar error while parsing the token stream.
    #[error("parse error at {0}: unexpected {1}")]
    Parse(Position, CompactString),

    /// A registry table received a second entry for a unique key.
    #[error("duplicate {kind} {name:?}: already registered at {first:?}")]
    Duplicate {
        /// Which table the duplicate occurred in.
        kind: DuplicateKind,
        /// The colliding name.
        name: CompactString,
        /// Where the name was first registered, if known.
        first: Option<CompactString>,
    },

    /// Conformance file could not be read or had fatally malformed syntax.
    #[error("conformance file error: {0}")]
    Conformance(CompactString),

    /// I/O error reading the source, a conformance file, or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which registry table a [`Error::Duplicate`] occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    /// Duplicate top-level `TypeName ::= Type` assignment.
    Assignment,
    /// Duplicate type registration under the same canonical path.
    Type,
    /// Duplicate value assignment.
    Value,
    /// Duplicate field registration on the same parent.
    Field,
}

impl std::fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Assignment => "assignment",
            Self::Type => "type",
            Self::Value => "value",
            Self::Field => "field",
        };
        f.write_str(s)
    }
}

/// A non-fatal diagnostic produced while walking the AST or loading
/// conformance files. Collected rather than printed directly so tests can
/// assert on them without capturing stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A conformance directive row duplicated an earlier one.
    ConformanceDuplicate {
        /// Directive table the duplicate occurred in.
        directive: CompactString,
        /// The colliding key.
        key: CompactString,
    },
    /// A conformance row was never consulted while compiling.
    ConformanceUnused {
        /// Directive table the row belongs to.
        directive: CompactString,
        /// The unused key.
        key: CompactString,
    },
    /// An unrecognised `#.DIRECTIVE` was encountered.
    ConformanceUnknownDirective {
        /// The unrecognised directive name.
        directive: CompactString,
    },
    /// A type reference could not be resolved to any declaration or import
    /// and was satisfied with a synthesised placeholder.
    DummyImport {
        /// The unresolved type name.
        name: CompactString,
        /// The placeholder protocol used for the dummy import.
        protocol: CompactString,
    },
    /// A dependency cycle was detected and is being emitted via forward
    /// declarations rather than treated as an error.
    Cycle {
        /// The canonicalised cycle, starting at its minimum-index member.
        members: Vec<CompactString>,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConformanceDuplicate { directive, key } => {
                write!(f, "duplicate row for {key:?} in #.{directive}")
            }
            Self::ConformanceUnused { directive, key } => {
                write!(f, "unused #.{directive} row for {key:?}")
            }
            Self::ConformanceUnknownDirective { directive } => {
                write!(f, "unknown directive #.{directive}")
            }
            Self::DummyImport { name, protocol } => {
                write!(f, "{name:?} not declared or imported, assuming dummy import from {protocol:?}")
            }
            Self::Cycle { members } => {
                write!(f, "dependency cycle: {}", members.join(" -> "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_display() {
        let err = Error::Duplicate {
            kind: DuplicateKind::Type,
            name: "Foo".into(),
            first: Some("mod.asn1:3".into()),
        };
        assert_eq!(
            err.to_string(),
            "duplicate type \"Foo\": already registered at Some(\"mod.asn1:3\")"
        );
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::DummyImport {
            name: "External".into(),
            protocol: "xxx".into(),
        };
        assert_eq!(
            d.to_string(),
            "\"External\" not declared or imported, assuming dummy import from \"xxx\""
        );
    }
}
