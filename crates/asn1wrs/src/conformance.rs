//! Loader for conformance overlay files.
//!
//! A conformance file is a sequence of `#.DIRECTIVE` blocks, each holding
//! rows until the next directive or `#.END`. This module parses that format
//! into typed tables and tracks which rows are consulted, so an unused row
//! can be reported once compilation finishes.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use smartstring::{LazyCompact, SmartString};

use crate::ast::TagClass;
use crate::error::{Diagnostic, Error, Result};

type CompactString = SmartString<LazyCompact>;

/// The two-bit export/user-defined/no-emit flag, kept as two explicit bools
/// rather than a single collapsed boolean (open question (c)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportFlags {
    pub function: bool,
    pub value_table: bool,
}

impl ExportFlags {
    /// Parses the original numeric flag spelling: `WITH_VALS` (3, both
    /// bits), `WITHOUT_VALS` (1, function only), `ONLY_VALS` (2, value
    /// table only).
    fn parse(word: &str) -> Option<Self> {
        match word {
            "WITH_VALS" => Some(Self {
                function: true,
                value_table: true,
            }),
            "WITHOUT_VALS" => Some(Self {
                function: true,
                value_table: false,
            }),
            "ONLY_VALS" => Some(Self {
                function: false,
                value_table: true,
            }),
            _ => None,
        }
    }
}

/// Directive names recognised by the loader, with their usage-tracking
/// policy (`chk_use` in the original's `tblcfg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Directive {
    Exports,
    UserDefined,
    NoEmit,
    ModuleImport,
    OmitAssignment,
    TypeRename,
    FieldRename,
    ImportTag,
    TypeAttr,
    EtypeAttr,
    FieldAttr,
    EfieldAttr,
    FnHdr,
    FnFtr,
    FnBody,
    Include,
}

impl Directive {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "EXPORTS" => Self::Exports,
            "USER_DEFINED" => Self::UserDefined,
            "NO_EMIT" => Self::NoEmit,
            "MODULE_IMPORT" => Self::ModuleImport,
            "OMIT_ASSIGNMENT" => Self::OmitAssignment,
            "TYPE_RENAME" => Self::TypeRename,
            "FIELD_RENAME" => Self::FieldRename,
            "IMPORT_TAG" => Self::ImportTag,
            "TYPE_ATTR" => Self::TypeAttr,
            "ETYPE_ATTR" => Self::EtypeAttr,
            "FIELD_ATTR" => Self::FieldAttr,
            "EFIELD_ATTR" => Self::EfieldAttr,
            "FN_HDR" => Self::FnHdr,
            "FN_FTR" => Self::FnFtr,
            "FN_BODY" => Self::FnBody,
            "INCLUDE" => Self::Include,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Exports => "EXPORTS",
            Self::UserDefined => "USER_DEFINED",
            Self::NoEmit => "NO_EMIT",
            Self::ModuleImport => "MODULE_IMPORT",
            Self::OmitAssignment => "OMIT_ASSIGNMENT",
            Self::TypeRename => "TYPE_RENAME",
            Self::FieldRename => "FIELD_RENAME",
            Self::ImportTag => "IMPORT_TAG",
            Self::TypeAttr => "TYPE_ATTR",
            Self::EtypeAttr => "ETYPE_ATTR",
            Self::FieldAttr => "FIELD_ATTR",
            Self::EfieldAttr => "EFIELD_ATTR",
            Self::FnHdr => "FN_HDR",
            Self::FnFtr => "FN_FTR",
            Self::FnBody => "FN_BODY",
            Self::Include => "INCLUDE",
        }
    }

    /// `chk_use` from the original's `tblcfg`: `IMPORT_TAG` and the
    /// `*TYPE_ATTR` tables are exempt from unused-row warnings.
    fn tracks_usage(self) -> bool {
        !matches!(self, Self::ImportTag | Self::TypeAttr | Self::EtypeAttr)
    }
}

/// An attribute bag parsed from a `KEY=VALUE …` row.
pub type AttrBag = FxHashMap<String, String>;

/// All conformance overlay data merged from one or more directive files.
#[derive(Debug, Default)]
pub struct Conformance {
    pub exports: FxHashMap<String, ExportFlags>,
    pub user_defined: FxHashMap<String, ExportFlags>,
    pub no_emit: FxHashMap<String, ExportFlags>,
    pub module_import: FxHashMap<String, String>,
    pub omit_assignment: FxHashMap<String, bool>,
    pub type_rename: FxHashMap<String, String>,
    pub field_rename: FxHashMap<String, String>,
    pub import_tag: FxHashMap<String, (TagClass, u32)>,
    pub type_attr: FxHashMap<String, AttrBag>,
    pub etype_attr: FxHashMap<String, AttrBag>,
    pub field_attr: FxHashMap<String, AttrBag>,
    pub efield_attr: FxHashMap<String, AttrBag>,
    pub fn_hdr: FxHashMap<String, String>,
    pub fn_ftr: FxHashMap<String, String>,
    pub fn_body: FxHashMap<String, String>,

    consulted: RefCell<HashSet<(&'static str, String)>>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

macro_rules! lookup_accessor {
    ($method:ident, $field:ident, $directive:expr, $out:ty) => {
        pub fn $method(&self, key: &str) -> Option<&$out> {
            self.mark_used($directive, key);
            self.$field.get(key)
        }
    };
}

impl Conformance {
    /// Loads and merges one or more conformance files, in order, following
    /// `INCLUDE` directives depth-first.
    pub fn load(paths: &[String]) -> Result<Self> {
        let mut conformance = Self::default();
        for path in paths {
            conformance.load_file(Path::new(path))?;
        }
        Ok(conformance)
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(Error::Io)?;
        self.parse_text(&text)
    }

    pub(crate) fn parse_text(&mut self, text: &str) -> Result<()> {
        let mut lines = text.lines().peekable();
        let mut current: Option<Directive> = None;
        let mut free_text_name: Option<String> = None;
        let mut free_text_buf = String::new();

        macro_rules! flush_free_text {
            ($map:ident) => {
                if let Some(name) = free_text_name.take() {
                    if self.$map.contains_key(&name) {
                        self.diagnostics.get_mut().push(Diagnostic::ConformanceDuplicate {
                            directive: current.unwrap().name().into(),
                            key: name.clone().into(),
                        });
                    }
                    self.$map.insert(name, free_text_buf.trim_end().to_string());
                }
                free_text_buf.clear();
            };
        }

        while let Some(raw) = lines.next() {
            let line = raw.trim_end();
            if let Some(rest) = line.trim_start().strip_prefix("#.") {
                let directive_name = rest.trim();
                if directive_name == "END" {
                    match current {
                        Some(Directive::FnHdr) => flush_free_text!(fn_hdr),
                        Some(Directive::FnFtr) => flush_free_text!(fn_ftr),
                        Some(Directive::FnBody) => flush_free_text!(fn_body),
                        _ => {}
                    }
                    current = None;
                    continue;
                }
                match current {
                    Some(Directive::FnHdr) => flush_free_text!(fn_hdr),
                    Some(Directive::FnFtr) => flush_free_text!(fn_ftr),
                    Some(Directive::FnBody) => flush_free_text!(fn_body),
                    _ => {}
                }
                current = match Directive::from_name(directive_name) {
                    Some(d) => Some(d),
                    None => {
                        self.diagnostics.get_mut().push(Diagnostic::ConformanceUnknownDirective {
                            directive: directive_name.into(),
                        });
                        None
                    }
                };
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if matches!(current, Some(Directive::FnHdr | Directive::FnFtr | Directive::FnBody)) {
                    free_text_buf.push('\n');
                }
                continue;
            }
            if trimmed.starts_with('#') && !trimmed.starts_with("#.") {
                continue; // plain comment row
            }
            let Some(directive) = current else { continue };
            match directive {
                Directive::Exports | Directive::UserDefined | Directive::NoEmit => {
                    let mut parts = trimmed.split_whitespace();
                    let Some(name) = parts.next() else { continue };
                    let flags = parts.next().and_then(ExportFlags::parse).unwrap_or(ExportFlags {
                        function: true,
                        value_table: true,
                    });
                    let map = match directive {
                        Directive::Exports => &mut self.exports,
                        Directive::UserDefined => &mut self.user_defined,
                        _ => &mut self.no_emit,
                    };
                    insert_checked(map, name.to_string(), flags, directive, &self.diagnostics);
                }
                Directive::ModuleImport => {
                    let mut parts = trimmed.splitn(2, char::is_whitespace);
                    let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                        continue;
                    };
                    insert_checked(
                        &mut self.module_import,
                        name.to_string(),
                        value.trim().to_string(),
                        directive,
                        &self.diagnostics,
                    );
                }
                Directive::OmitAssignment => {
                    let mut parts = trimmed.split_whitespace();
                    let Some(name) = parts.next() else { continue };
                    let val = parts.next().map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(true);
                    insert_checked(&mut self.omit_assignment, name.to_string(), val, directive, &self.diagnostics);
                }
                Directive::TypeRename | Directive::FieldRename => {
                    let mut parts = trimmed.split_whitespace();
                    let (Some(name), Some(new_name)) = (parts.next(), parts.next()) else {
                        continue;
                    };
                    let map = if directive == Directive::TypeRename {
                        &mut self.type_rename
                    } else {
                        &mut self.field_rename
                    };
                    insert_checked(map, name.to_string(), new_name.to_string(), directive, &self.diagnostics);
                }
                Directive::ImportTag => {
                    let mut parts = trimmed.split_whitespace();
                    let (Some(name), Some(class), Some(number)) = (parts.next(), parts.next(), parts.next())
                    else {
                        continue;
                    };
                    let class = match class {
                        "APPLICATION" => TagClass::Application,
                        "PRIVATE" => TagClass::Private,
                        "UNIVERSAL" => TagClass::Universal,
                        _ => TagClass::Context,
                    };
                    let Ok(number) = number.parse::<u32>() else { continue };
                    insert_checked(&mut self.import_tag, name.to_string(), (class, number), directive, &self.diagnostics);
                }
                Directive::TypeAttr | Directive::EtypeAttr | Directive::FieldAttr | Directive::EfieldAttr => {
                    let mut parts = trimmed.splitn(2, char::is_whitespace);
                    let Some(name) = parts.next() else { continue };
                    let rest = parts.next().unwrap_or("");
                    let bag = parse_attr_bag(rest);
                    let map = match directive {
                        Directive::TypeAttr => &mut self.type_attr,
                        Directive::EtypeAttr => &mut self.etype_attr,
                        Directive::FieldAttr => &mut self.field_attr,
                        _ => &mut self.efield_attr,
                    };
                    insert_checked(map, name.to_string(), bag, directive, &self.diagnostics);
                }
                Directive::FnHdr | Directive::FnFtr | Directive::FnBody => {
                    if free_text_name.is_none() {
                        free_text_name = Some(trimmed.to_string());
                    } else {
                        free_text_buf.push_str(line);
                        free_text_buf.push('\n');
                    }
                }
                Directive::Include => {
                    self.load_file(Path::new(trimmed))?;
                }
            }
        }
        match current {
            Some(Directive::FnHdr) => flush_free_text!(fn_hdr),
            Some(Directive::FnFtr) => flush_free_text!(fn_ftr),
            Some(Directive::FnBody) => flush_free_text!(fn_body),
            _ => {}
        }
        Ok(())
    }

    fn mark_used(&self, directive: &'static str, key: &str) {
        self.consulted.borrow_mut().insert((directive, key.to_string()));
    }

    lookup_accessor!(exports_for, exports, "EXPORTS", ExportFlags);
    lookup_accessor!(user_defined_for, user_defined, "USER_DEFINED", ExportFlags);
    lookup_accessor!(no_emit_for, no_emit, "NO_EMIT", ExportFlags);
    lookup_accessor!(type_rename_for, type_rename, "TYPE_RENAME", String);
    lookup_accessor!(field_rename_for, field_rename, "FIELD_RENAME", String);
    lookup_accessor!(fn_hdr_for, fn_hdr, "FN_HDR", String);
    lookup_accessor!(fn_ftr_for, fn_ftr, "FN_FTR", String);
    lookup_accessor!(fn_body_for, fn_body, "FN_BODY", String);
    lookup_accessor!(efield_attr_for, efield_attr, "EFIELD_ATTR", AttrBag);
    lookup_accessor!(field_attr_for, field_attr, "FIELD_ATTR", AttrBag);
    lookup_accessor!(type_attr_for, type_attr, "TYPE_ATTR", AttrBag);
    lookup_accessor!(etype_attr_for, etype_attr, "ETYPE_ATTR", AttrBag);

    pub fn module_import_for(&self, key: &str) -> Option<&String> {
        self.mark_used("MODULE_IMPORT", key);
        self.module_import.get(key)
    }

    pub fn omit_assignment_for(&self, key: &str) -> bool {
        self.mark_used("OMIT_ASSIGNMENT", key);
        self.omit_assignment.get(key).copied().unwrap_or(false)
    }

    /// Diagnostics collected while loading (duplicate rows, unknown
    /// directives) plus unused-row warnings for every `chk_use` table.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = self.diagnostics.borrow().clone();
        let consulted = self.consulted.borrow();
        for directive in [
            Directive::Exports,
            Directive::UserDefined,
            Directive::NoEmit,
            Directive::ModuleImport,
            Directive::OmitAssignment,
            Directive::TypeRename,
            Directive::FieldRename,
            Directive::FieldAttr,
            Directive::EfieldAttr,
            Directive::FnHdr,
            Directive::FnFtr,
            Directive::FnBody,
        ] {
            if !directive.tracks_usage() {
                continue;
            }
            for key in self.keys_for(directive) {
                if !consulted.contains(&(directive.name(), key.clone())) {
                    out.push(Diagnostic::ConformanceUnused {
                        directive: directive.name().into(),
                        key: key.into(),
                    });
                }
            }
        }
        out
    }

    fn keys_for(&self, directive: Directive) -> Vec<String> {
        match directive {
            Directive::Exports => self.exports.keys().cloned().collect(),
            Directive::UserDefined => self.user_defined.keys().cloned().collect(),
            Directive::NoEmit => self.no_emit.keys().cloned().collect(),
            Directive::ModuleImport => self.module_import.keys().cloned().collect(),
            Directive::OmitAssignment => self.omit_assignment.keys().cloned().collect(),
            Directive::TypeRename => self.type_rename.keys().cloned().collect(),
            Directive::FieldRename => self.field_rename.keys().cloned().collect(),
            Directive::FieldAttr => self.field_attr.keys().cloned().collect(),
            Directive::EfieldAttr => self.efield_attr.keys().cloned().collect(),
            Directive::FnHdr => self.fn_hdr.keys().cloned().collect(),
            Directive::FnFtr => self.fn_ftr.keys().cloned().collect(),
            Directive::FnBody => self.fn_body.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

fn insert_checked<V>(
    map: &mut FxHashMap<String, V>,
    key: String,
    value: V,
    directive: Directive,
    diagnostics: &RefCell<Vec<Diagnostic>>,
) {
    if map.contains_key(&key) {
        diagnostics.borrow_mut().push(Diagnostic::ConformanceDuplicate {
            directive: directive.name().into(),
            key: CompactString::from(key.as_str()),
        });
    }
    map.insert(key, value);
}

fn parse_attr_bag(rest: &str) -> AttrBag {
    let mut bag = AttrBag::default();
    for piece in rest.split_whitespace() {
        if let Some((k, v)) = piece.split_once('=') {
            bag.insert(k.to_string(), v.to_string());
        }
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_and_rename() {
        let mut c = Conformance::default();
        c.parse_text("#.EXPORTS\nFoo WITH_VALS\n#.TYPE_RENAME\nMessage Msg\n#.END\n")
            .unwrap();
        assert_eq!(
            c.exports_for("Foo"),
            Some(&ExportFlags {
                function: true,
                value_table: true
            })
        );
        assert_eq!(c.type_rename_for("Message"), Some(&"Msg".to_string()));
    }

    #[test]
    fn fn_body_captures_free_text() {
        let mut c = Conformance::default();
        c.parse_text("#.FN_BODY\nMsg\n  /*custom*/\n#.END\n").unwrap();
        assert_eq!(c.fn_body_for("Msg"), Some(&"  /*custom*/".to_string()));
    }

    #[test]
    fn duplicate_row_is_diagnosed() {
        let mut c = Conformance::default();
        c.parse_text("#.EXPORTS\nFoo WITH_VALS\nFoo ONLY_VALS\n#.END\n").unwrap();
        assert!(c
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::ConformanceDuplicate { .. })));
    }

    #[test]
    fn unknown_directive_is_diagnosed() {
        let mut c = Conformance::default();
        c.parse_text("#.BOGUS\nFoo bar\n#.END\n").unwrap();
        assert!(c
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::ConformanceUnknownDirective { .. })));
    }

    #[test]
    fn unused_row_is_diagnosed_after_query() {
        let mut c = Conformance::default();
        c.parse_text("#.TYPE_RENAME\nMessage Msg\n#.END\n").unwrap();
        assert!(c
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::ConformanceUnused { .. })));
        c.type_rename_for("Message");
        assert!(!c
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::ConformanceUnused { .. })));
    }

    #[test]
    fn import_tag_is_exempt_from_unused_warning() {
        let mut c = Conformance::default();
        c.parse_text("#.IMPORT_TAG\nFoo CONTEXT 3\n#.END\n").unwrap();
        assert!(!c
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::ConformanceUnused { .. })));
    }
}
