//! Typed abstract syntax tree produced by the parser.
//!
//! Every syntactic category is one sum type (`TypeVariant`, `Value`,
//! `ConstraintKind`) dispatched with a `match` rather than a class
//! hierarchy. There is no vtable and no downcasting anywhere in this
//! module.

use smallvec::SmallVec;

/// A complete parsed module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub imports: Vec<Import>,
    pub exports: Option<Vec<String>>,
    pub assignments: Vec<Assignment>,
}

/// `IMPORTS ... FROM SourceModule;` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub source_module: String,
    pub names: Vec<String>,
}

/// A top-level assignment: either a type or a value assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Type(TypeAssignment),
    Value(ValueAssignment),
}

/// `TypeName ::= Type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssignment {
    pub name: String,
    pub ty: Type,
}

/// `valueName Type ::= Value`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAssignment {
    pub name: String,
    pub ty: Type,
    pub value: Value,
}

/// Tag class, per X.680 §8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    Context,
    Private,
}

/// Tagging mode for a `Tagged` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// No `IMPLICIT`/`EXPLICIT` keyword given; resolved against the
    /// module's `IMPLICIT`/`EXPLICIT`/`AUTOMATIC TAGS` default.
    Default,
    Implicit,
    Explicit,
}

/// An explicit or synthesised tag attached to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub class: TagClass,
    pub number: u32,
    pub mode: TagMode,
}

/// One ASN.1 type, with its shared attributes (optional field name,
/// constraints, tag) and variant-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    /// Present when this type occurs as a named field of a constructed
    /// type; `None` for a bare top-level or anonymous type.
    pub name: Option<String>,
    pub constraints: Vec<Constraint>,
    pub tag: Option<TagSpec>,
    pub variant: TypeVariant,
}

impl Type {
    #[must_use]
    pub fn anonymous(variant: TypeVariant) -> Self {
        Self {
            name: None,
            constraints: Vec::new(),
            tag: None,
            variant,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, variant: TypeVariant) -> Self {
        Self {
            name: Some(name.into()),
            constraints: Vec::new(),
            tag: None,
            variant,
        }
    }
}

/// One named field inside a `SEQUENCE`/`SET`/`CHOICE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub ty: Type,
    pub optional: bool,
    pub default: Option<Value>,
}

/// `(name, value)` for an `INTEGER`'s named numbers or an `ENUMERATED`
/// item's explicit discriminant.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedNumber {
    pub name: String,
    pub value: i64,
}

/// The closed set of ASN.1 type variants the core recognises.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeVariant {
    TypeRef(String),
    ExtTypeRef { module: String, name: String },

    Boolean,
    Integer {
        named: Vec<NamedNumber>,
    },
    Enumerated {
        items: Vec<NamedNumber>,
        extensible: bool,
        /// Items declared after the extension marker.
        extension_items: Vec<NamedNumber>,
    },
    Real,
    Null,
    ObjectIdentifier,
    ObjectDescriptor,
    OctetString,
    BitString {
        named: Vec<NamedNumber>,
    },
    RestrictedString(RestrictedStringKind),
    UnrestrictedCharacterString,
    GeneralizedTime,
    UTCTime,

    Sequence {
        elements: Vec<(String, Element)>,
        extensible: bool,
    },
    Set {
        elements: Vec<(String, Element)>,
        extensible: bool,
    },
    Choice {
        alternatives: Vec<(String, Element)>,
        extensible: bool,
    },
    SequenceOf(Box<Type>),
    SetOf(Box<Type>),

    Tagged(Box<Type>),
}

/// The 13 restricted character-string variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedStringKind {
    Bmp,
    General,
    Graphic,
    Ia5,
    Iso646,
    Numeric,
    Printable,
    Teletex,
    T61,
    Universal,
    Utf8,
    Videotex,
    Visible,
}

impl RestrictedStringKind {
    #[must_use]
    pub fn from_reserved(word: &str) -> Option<Self> {
        Some(match word {
            "BMPString" => Self::Bmp,
            "GeneralString" => Self::General,
            "GraphicString" => Self::Graphic,
            "IA5String" => Self::Ia5,
            "ISO646String" => Self::Iso646,
            "NumericString" => Self::Numeric,
            "PrintableString" => Self::Printable,
            "TeletexString" => Self::Teletex,
            "T61String" => Self::T61,
            "UniversalString" => Self::Universal,
            "UTF8String" => Self::Utf8,
            "VideotexString" => Self::Videotex,
            "VisibleString" => Self::Visible,
            _ => return None,
        })
    }
}

/// A value expression. Only the subset needed to name entities and build
/// object identifiers is modelled (per the Non-goals in the specification).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Identifier(String),
    ObjectIdentifier(Vec<OidComponent>),
    BString(String),
    HString(String),
    QString(String),
}

/// One arc of an `OBJECT IDENTIFIER` value, either a bare number or a
/// `name(number)` / bare `name` pair resolved against the OID name table.
#[derive(Debug, Clone, PartialEq)]
pub enum OidComponent {
    Number(u32),
    Named { name: String, number: Option<u32> },
}

/// Constraint productions (X.682/X.683 §). Per the specification, only
/// `Size` and `ValueRange` influence code emission; the rest are parsed and
/// carried on the AST for completeness but never read by the emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    SingleValue(Value),
    ValueRange {
        lower: RangeBound,
        upper: RangeBound,
    },
    Size(Box<ConstraintKind>),
    ContainedSubtype(Box<Type>),
    PermittedAlphabet(Box<ConstraintKind>),
    Pattern(String),
    UserDefined(String),
    InnerType(SmallVec<[String; 4]>),
}

/// A range endpoint: a literal value, or `MIN`/`MAX`.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    Value(Value),
    Min,
    Max,
}

/// One parsed constraint, with an `extensible` marker for `(..., ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub extensible: bool,
}

impl Constraint {
    /// Extracts `(min, max)` from a `ValueRange` or `Size(ValueRange)`
    /// constraint, resolving integer literals only (the Non-goal excludes
    /// evaluating arbitrary value expressions). Returns `None` for any
    /// other constraint kind or unresolved bound.
    #[must_use]
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        let range = match &self.kind {
            ConstraintKind::ValueRange { lower, upper } => (lower, upper),
            ConstraintKind::Size(inner) => {
                if let ConstraintKind::ValueRange { lower, upper } = inner.as_ref() {
                    (lower, upper)
                } else {
                    return None;
                }
            }
            _ => return None,
        };
        let lo = match range.0 {
            RangeBound::Value(Value::Integer(n)) => *n,
            RangeBound::Min => i64::MIN,
            _ => return None,
        };
        let hi = match range.1 {
            RangeBound::Value(Value::Integer(n)) => *n,
            RangeBound::Max => i64::MAX,
            _ => return None,
        };
        Some((lo, hi))
    }
}
