//! Semantic registry: canonicalises the AST into a resolved emission model.
//!
//! Proceeds in four phases, matching the four-phase design: walk & register,
//! wire-name synthesis, dependency-graph construction with cycle detection,
//! and field reconciliation.

use rustc_hash::FxHashMap;

use crate::ast::{Element, Module, Type, TypeVariant, Value};
use crate::conformance::{Conformance, ExportFlags};
use crate::error::{Diagnostic, DuplicateKind, Error, Result};

/// Placeholder protocol name used for a type that is neither declared nor
/// imported (§7 `DummyImport`).
pub const DUMMY_IMPORT_PROTOCOL: &str = "xxx";

/// Merged attribute bag: explicit fields for the known keys, plus an open
/// overlay map for anything else a conformance row supplies.
#[derive(Debug, Clone)]
pub struct Attrs {
    pub ftype: String,
    pub display: String,
    pub strings: Option<String>,
    pub bitmask: String,
    pub abbrev: Option<String>,
    pub blurb: Option<String>,
    pub extra: FxHashMap<String, String>,
}

impl Default for Attrs {
    fn default() -> Self {
        Self {
            ftype: "FT_NONE".to_string(),
            display: "BASE_NONE".to_string(),
            strings: None,
            bitmask: "0".to_string(),
            abbrev: None,
            blurb: None,
            extra: FxHashMap::default(),
        }
    }
}

impl Attrs {
    /// Overlays `bag`'s entries, right-wins, onto `self`.
    fn merge_bag(&mut self, bag: &FxHashMap<String, String>) {
        for (k, v) in bag {
            match k.as_str() {
                "TYPE" => self.ftype = v.clone(),
                "DISPLAY" => self.display = v.clone(),
                "STRINGS" => self.strings = Some(v.clone()),
                "BITMASK" => self.bitmask = v.clone(),
                "ABBREV" => self.abbrev = Some(v.clone()),
                "BLURB" => self.blurb = Some(v.clone()),
                _ => {
                    self.extra.insert(k.clone(), v.clone());
                }
            }
        }
    }
}

/// A registered type: a declared assignment, an anonymous substructure, or
/// an import (real or synthesised "dummy").
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub key: String,
    pub variant: Option<TypeVariant>,
    pub constraints: Vec<crate::ast::Constraint>,
    pub is_import: bool,
    /// For imports: the protocol name whose dissector implements this type.
    pub originating_module: Option<String>,
    pub wire_name: String,
    pub export: ExportFlags,
    pub user_defined: ExportFlags,
    pub no_emit: ExportFlags,
    pub attrs: Attrs,
}

/// A registered field on some parent constructed type.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub key: String,
    pub parent: String,
    pub local_name: String,
    pub type_key: String,
    pub is_implicit: bool,
    pub wire_name: String,
    pub attrs: Attrs,
}

/// A registered `valueName Type ::= Value` binding.
#[derive(Debug, Clone)]
pub struct ValueEntry {
    pub key: String,
    pub type_key: String,
    pub value: Value,
    pub export: ExportFlags,
    pub wire_name: String,
    /// Numeric arcs for an `OBJECT IDENTIFIER` value, named components
    /// resolved against the OID name table (§6.2); `None` for any other
    /// value kind.
    pub resolved_oid: Option<Vec<u32>>,
}

/// The fully resolved semantic model for one module.
#[derive(Debug, Default)]
pub struct Registry {
    pub assignments: Vec<String>,
    pub value_assignments: Vec<String>,
    pub types: Vec<TypeEntry>,
    pub type_index: FxHashMap<String, usize>,
    pub fields: Vec<FieldEntry>,
    pub field_index: FxHashMap<String, usize>,
    pub values: Vec<ValueEntry>,
    pub value_index: FxHashMap<String, usize>,
    /// `type_key -> [type_key]`, types this type syntactically mentions.
    pub type_deps: FxHashMap<String, Vec<String>>,
    pub value_deps: FxHashMap<String, Vec<String>>,
    /// `source_module -> dissector protocol name`.
    pub module_imports: FxHashMap<String, String>,
    /// Canonicalised cycles found during dependency ordering, as type keys.
    pub cycles: Vec<Vec<String>>,
    /// `type_key -> [value_key]`, values a type's defaults/constraints
    /// name by identifier. Used only to seed export-bit propagation
    /// (invariant 4); not part of the public registry contract.
    type_value_refs: FxHashMap<String, Vec<String>>,
    dup_types: FxHashMap<String, Vec<String>>,
    dup_fields: FxHashMap<String, Vec<String>>,
    declared_top_level: FxHashMap<String, ()>,
    imported_names: FxHashMap<String, String>,
}

impl Registry {
    pub fn type_entry(&self, key: &str) -> Option<&TypeEntry> {
        self.type_index.get(key).map(|&i| &self.types[i])
    }

    pub fn field_entry(&self, key: &str) -> Option<&FieldEntry> {
        self.field_index.get(key).map(|&i| &self.fields[i])
    }
}

struct Builder<'a> {
    registry: Registry,
    conformance: &'a Conformance,
    diagnostics: Vec<Diagnostic>,
}

/// Builds the registry for `module`, merging in `conformance` overlays.
/// Returns the registry plus accumulated diagnostics (non-fatal warnings).
pub fn build(module: &Module, conformance: &Conformance) -> Result<(Registry, Vec<Diagnostic>)> {
    log::debug!("building registry for module {}", module.name);
    let mut b = Builder {
        registry: Registry::default(),
        conformance,
        diagnostics: Vec::new(),
    };
    b.phase1_walk(module)?;
    log::debug!("phase 1 complete: {} types, {} values registered", b.registry.types.len(), b.registry.values.len());
    b.phase2_wire_names();
    let cycles = b.phase3_dependency_order();
    if !cycles.is_empty() {
        log::debug!("phase 3 found {} dependency cycle(s)", cycles.len());
    }
    b.phase4_field_reconciliation();
    b.phase5_export_propagation();
    for cycle in &cycles {
        let members = cycle
            .iter()
            .map(|k| {
                b.registry
                    .type_entry(k)
                    .map(|t| t.wire_name.clone())
                    .unwrap_or_else(|| k.clone())
                    .into()
            })
            .collect();
        b.diagnostics.push(Diagnostic::Cycle { members });
    }
    b.registry.cycles = cycles;
    for d in conformance.diagnostics() {
        b.diagnostics.push(d);
    }
    Ok((b.registry, b.diagnostics))
}

impl<'a> Builder<'a> {
    fn phase1_walk(&mut self, module: &Module) -> Result<()> {
        for import in &module.imports {
            let protocol = self
                .conformance
                .module_import_for(&import.source_module)
                .cloned()
                .unwrap_or_else(|| import.source_module.to_ascii_lowercase());
            self.registry.module_imports.insert(import.source_module.clone(), protocol);
            for name in &import.names {
                self.registry.imported_names.insert(name.clone(), import.source_module.clone());
            }
        }

        for assignment in &module.assignments {
            match assignment {
                crate::ast::Assignment::Type(t) => {
                    self.registry.declared_top_level.insert(t.name.clone(), ());
                }
                crate::ast::Assignment::Value(_) => {}
            }
        }

        for assignment in &module.assignments {
            match assignment {
                crate::ast::Assignment::Type(t) => {
                    if self.conformance.omit_assignment_for(&t.name) {
                        continue;
                    }
                    self.registry.assignments.push(t.name.clone());
                    self.register_type(&t.name, &t.ty)?;
                }
                crate::ast::Assignment::Value(v) => {
                    if self.conformance.omit_assignment_for(&v.name) {
                        continue;
                    }
                    self.registry.value_assignments.push(v.name.clone());
                    self.register_value(v)?;
                }
            }
        }
        Ok(())
    }

    fn register_value(&mut self, v: &crate::ast::ValueAssignment) -> Result<()> {
        let key = v.name.clone();
        if self.registry.value_index.contains_key(&key) {
            return Err(Error::Duplicate {
                kind: DuplicateKind::Value,
                name: key.as_str().into(),
                first: None,
            });
        }
        let type_key = self.resolve_type_ref(&v.ty.variant)?;
        let resolved_oid = match &v.value {
            Value::ObjectIdentifier(components) => Some(crate::oid::resolve(components)),
            _ => None,
        };
        let idx = self.registry.values.len();
        self.registry.values.push(ValueEntry {
            key: key.clone(),
            type_key,
            value: v.value.clone(),
            export: ExportFlags::default(),
            wire_name: key.replace('-', "_"),
            resolved_oid,
        });
        if let Value::Identifier(target) = &v.value {
            self.registry.value_deps.entry(key.clone()).or_default().push(target.clone());
        }
        self.registry.value_index.insert(key, idx);
        Ok(())
    }

    /// Registers `path`'s own type entry (if not already present — the
    /// entry may pre-exist as a forward-referenced placeholder) and
    /// recurses into substructure.
    fn register_type(&mut self, path: &str, ty: &Type) -> Result<()> {
        if self.registry.type_index.contains_key(path) {
            return Err(Error::Duplicate {
                kind: DuplicateKind::Type,
                name: path.into(),
                first: None,
            });
        }
        let idx = self.registry.types.len();
        self.registry.types.push(TypeEntry {
            key: path.to_string(),
            variant: Some(ty.variant.clone()),
            constraints: ty.constraints.clone(),
            is_import: false,
            originating_module: None,
            wire_name: String::new(),
            export: ExportFlags::default(),
            user_defined: ExportFlags::default(),
            no_emit: ExportFlags::default(),
            attrs: Attrs::default(),
        });
        self.registry.type_index.insert(path.to_string(), idx);
        self.record_constraint_value_refs(path, &ty.constraints);

        let mut deps = Vec::new();
        match &ty.variant {
            TypeVariant::TypeRef(_) | TypeVariant::ExtTypeRef { .. } => {
                deps.push(self.resolve_type_ref(&ty.variant)?);
            }
            TypeVariant::Sequence { elements, .. }
            | TypeVariant::Set { elements, .. }
            | TypeVariant::Choice {
                alternatives: elements,
                ..
            } => {
                for (name, element) in elements {
                    let child_path = format!("{path}/{name}");
                    self.register_field(path, &child_path, name, element)?;
                    deps.push(child_path);
                }
            }
            TypeVariant::SequenceOf(inner) | TypeVariant::SetOf(inner) => {
                let child_path = format!("{path}/_item");
                self.register_type(&child_path, inner)?;
                deps.push(child_path);
            }
            TypeVariant::Tagged(inner) => {
                let child_path = format!("{path}/_tag");
                self.register_type(&child_path, inner)?;
                deps.push(child_path);
            }
            _ => {}
        }
        self.registry.type_deps.insert(path.to_string(), deps);
        Ok(())
    }

    fn register_field(&mut self, parent: &str, path: &str, local_name: &str, element: &Element) -> Result<()> {
        self.register_type(path, &element.ty)?;
        let idx = self.registry.fields.len();
        self.registry.fields.push(FieldEntry {
            key: path.to_string(),
            parent: parent.to_string(),
            local_name: local_name.to_string(),
            type_key: path.to_string(),
            is_implicit: matches!(
                element.ty.tag.map(|t| t.mode),
                Some(crate::ast::TagMode::Implicit)
            ),
            wire_name: String::new(),
            attrs: Attrs::default(),
        });
        self.registry.field_index.insert(path.to_string(), idx);
        if let Some(Value::Identifier(target)) = &element.default {
            self.registry.type_value_refs.entry(parent.to_string()).or_default().push(target.clone());
        }
        Ok(())
    }

    /// Records identifiers named by a type's constraints (e.g. a
    /// `SingleValue` constraint referencing a `valueName Type ::= Value`
    /// assignment by name) so export-bit propagation (invariant 4) can
    /// find them later.
    fn record_constraint_value_refs(&mut self, path: &str, constraints: &[crate::ast::Constraint]) {
        for constraint in constraints {
            if let crate::ast::ConstraintKind::SingleValue(Value::Identifier(name)) = &constraint.kind {
                self.registry.type_value_refs.entry(path.to_string()).or_default().push(name.clone());
            }
        }
    }

    /// Resolves a `TypeRef`/`ExtTypeRef` to a canonical type key, registering
    /// an import or dummy-import entry the first time an external name is
    /// referenced.
    fn resolve_type_ref(&mut self, variant: &TypeVariant) -> Result<String> {
        let (module, name) = match variant {
            TypeVariant::TypeRef(n) => (None, n.clone()),
            TypeVariant::ExtTypeRef { module, name } => (Some(module.clone()), name.clone()),
            _ => return Ok(String::new()),
        };

        if module.is_none() && self.registry.declared_top_level.contains_key(&name) {
            return Ok(name);
        }

        let source_module = module.or_else(|| self.registry.imported_names.get(&name).cloned());
        let (key_module, protocol) = match source_module {
            Some(m) => {
                let protocol = self
                    .registry
                    .module_imports
                    .get(&m)
                    .cloned()
                    .unwrap_or_else(|| m.to_ascii_lowercase());
                (m, protocol)
            }
            None => {
                self.diagnostics.push(Diagnostic::DummyImport {
                    name: name.as_str().into(),
                    protocol: DUMMY_IMPORT_PROTOCOL.into(),
                });
                (DUMMY_IMPORT_PROTOCOL.to_string(), DUMMY_IMPORT_PROTOCOL.to_string())
            }
        };
        let key = format!("{key_module}::{name}");
        if !self.registry.type_index.contains_key(&key) {
            let idx = self.registry.types.len();
            self.registry.types.push(TypeEntry {
                key: key.clone(),
                variant: None,
                constraints: Vec::new(),
                is_import: true,
                originating_module: Some(protocol),
                wire_name: name.clone(),
                export: ExportFlags::default(),
                user_defined: ExportFlags::default(),
                no_emit: ExportFlags::default(),
                attrs: Attrs::default(),
            });
            self.registry.type_index.insert(key.clone(), idx);
            self.registry.type_deps.insert(key.clone(), Vec::new());
        }
        Ok(key)
    }

    // --- Phase 2: wire-name synthesis ---------------------------------

    fn phase2_wire_names(&mut self) {
        let keys: Vec<String> = self.registry.types.iter().map(|t| t.key.clone()).collect();
        for key in keys {
            if self.registry.types[self.registry.type_index[&key]].is_import {
                continue; // wire_name already set to the bare imported name
            }
            let overridden = self.conformance.type_rename_for(&key).cloned();
            let base = overridden.unwrap_or_else(|| synth_wire_name(&key));
            let wire_name = self.resolve_type_collision(&key, base);
            let local_name = key.rsplit('/').next().unwrap_or(&key).to_string();
            let export = self.conformance.exports_for(&local_name).copied().unwrap_or_default();
            let user_defined = self.conformance.user_defined_for(&local_name).copied().unwrap_or_default();
            let no_emit = self.conformance.no_emit_for(&local_name).copied().unwrap_or_default();
            let idx = self.registry.type_index[&key];
            self.registry.types[idx].wire_name = wire_name;
            self.registry.types[idx].export = export;
            self.registry.types[idx].user_defined = user_defined;
            self.registry.types[idx].no_emit = no_emit;
        }

        let field_keys: Vec<String> = self.registry.fields.iter().map(|f| f.key.clone()).collect();
        for key in field_keys {
            let overridden = self.conformance.field_rename_for(&key).cloned();
            let base = overridden.unwrap_or_else(|| synth_wire_name(&key));
            let type_key = self.registry.fields[self.registry.field_index[&key]].type_key.clone();
            let wire_name = self.resolve_field_collision(&key, &type_key, base);
            self.registry.fields[self.registry.field_index[&key]].wire_name = wire_name;
        }
    }

    fn resolve_type_collision(&mut self, key: &str, base: String) -> String {
        let owners = self.dup_types_entry(&base);
        if owners.is_empty() || owners.contains(&key.to_string()) {
            owners.push(key.to_string());
            return base;
        }
        let suffix = owners.len();
        owners.push(key.to_string());
        format!("{base}{suffix}")
    }

    fn resolve_field_collision(&mut self, key: &str, type_key: &str, base: String) -> String {
        let owners = self.registry.dup_fields.entry(base.clone()).or_default();
        if let Some(existing) = owners.first() {
            let existing_type_key = self
                .registry
                .field_index
                .get(existing)
                .map(|&i| self.registry.fields[i].type_key.clone());
            if existing_type_key.as_deref() == Some(type_key) {
                owners.push(key.to_string());
                return base;
            }
            let suffix = owners.len();
            owners.push(key.to_string());
            return format!("{base}{suffix}");
        }
        owners.push(key.to_string());
        base
    }

    fn dup_types_entry(&mut self, base: &str) -> &mut Vec<String> {
        self.registry.dup_types.entry(base.to_string()).or_default()
    }

    // --- Phase 3: dependency graph + cycle detection ------------------

    /// Returns the canonicalised cycles found during the DFS. As a side
    /// effect nothing else is recorded here; emission order is derived from
    /// the same dependency map directly by the emitter (reverse post-order).
    fn phase3_dependency_order(&mut self) -> Vec<Vec<String>> {
        #[derive(PartialEq, Eq, Clone, Copy)]
        enum Mark {
            White,
            Gray,
            Black,
        }
        let mut mark: FxHashMap<String, Mark> = FxHashMap::default();
        let mut cycles = Vec::new();
        let keys: Vec<String> = self.registry.types.iter().map(|t| t.key.clone()).collect();
        let order_index: FxHashMap<String, usize> =
            keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();

        fn visit(
            key: &str,
            deps: &FxHashMap<String, Vec<String>>,
            mark: &mut FxHashMap<String, Mark>,
            stack: &mut Vec<String>,
            cycles: &mut Vec<Vec<String>>,
            order_index: &FxHashMap<String, usize>,
        ) {
            match mark.get(key).copied().unwrap_or(Mark::White) {
                Mark::Black => return,
                Mark::Gray => {
                    if let Some(pos) = stack.iter().position(|k| k == key) {
                        let mut cycle: Vec<String> = stack[pos..].to_vec();
                        let min_pos = cycle
                            .iter()
                            .enumerate()
                            .min_by_key(|(_, k)| order_index.get(*k).copied().unwrap_or(usize::MAX))
                            .map(|(i, _)| i)
                            .unwrap_or(0);
                        cycle.rotate_left(min_pos);
                        cycles.push(cycle);
                    }
                    return;
                }
                Mark::White => {}
            }
            mark.insert(key.to_string(), Mark::Gray);
            stack.push(key.to_string());
            if let Some(children) = deps.get(key) {
                for child in children {
                    if child.is_empty() {
                        continue;
                    }
                    visit(child, deps, mark, stack, cycles, order_index);
                }
            }
            stack.pop();
            mark.insert(key.to_string(), Mark::Black);
        }

        let mut stack = Vec::new();
        for key in &keys {
            visit(key, &self.registry.type_deps, &mut mark, &mut stack, &mut cycles, &order_index);
        }
        cycles
    }

    // --- Phase 4: field reconciliation ---------------------------------

    fn phase4_field_reconciliation(&mut self) {
        for idx in 0..self.registry.types.len() {
            let (ftype, display) = self.registry.types[idx]
                .variant
                .as_ref()
                .map(inherent_ftype)
                .unwrap_or(("FT_NONE", "BASE_NONE"));
            self.registry.types[idx].attrs.ftype = ftype.to_string();
            self.registry.types[idx].attrs.display = display.to_string();
            let key = self.registry.types[idx].key.clone();
            let local_name = key.rsplit('/').next().unwrap_or(&key).to_string();
            let mut extra_bag = FxHashMap::default();
            if let Some(bag) = self.conformance.type_attr_for(&local_name) {
                extra_bag.extend(bag.clone());
            }
            if let Some(bag) = self.conformance.etype_attr_for(&local_name) {
                extra_bag.extend(bag.clone());
            }
            self.registry.types[idx].attrs.merge_bag(&extra_bag);
        }
        for idx in 0..self.registry.fields.len() {
            let type_key = self.registry.fields[idx].type_key.clone();
            let (ftype, display) = self
                .registry
                .type_entry(&type_key)
                .and_then(|t| t.variant.as_ref())
                .map(inherent_ftype)
                .unwrap_or(("FT_NONE", "BASE_NONE"));
            let mut attrs = Attrs {
                ftype: ftype.to_string(),
                display: display.to_string(),
                ..Attrs::default()
            };
            if let Some(bag) = self.registry.type_entry(&type_key).map(|t| t.attrs.extra.clone()) {
                attrs.merge_bag(&bag);
            }
            let local_name = self.registry.fields[idx].local_name.clone();
            if let Some(bag) = self.conformance.field_attr_for(&local_name).cloned() {
                attrs.merge_bag(&bag);
            }
            if let Some(bag) = self.conformance.efield_attr_for(&local_name).cloned() {
                attrs.merge_bag(&bag);
            }
            attrs.abbrev.get_or_insert_with(|| local_name.replace('-', "_"));
            self.registry.fields[idx].attrs = attrs;
        }
    }

    // --- Phase 5: export-bit propagation (invariant 4) -----------------

    /// For every exported type, walks its transitive type-dependency
    /// closure collecting value identifiers it names (defaults, single-value
    /// constraints), then walks those values' own dependency closure
    /// (`valueName ::= otherValueName`-style chains), setting the export
    /// bit on every value reached. Exported ⇒ all transitive
    /// value-dependencies also carry the export bit.
    fn phase5_export_propagation(&mut self) {
        let exported_roots: Vec<String> = self
            .registry
            .types
            .iter()
            .filter(|t| !t.is_import && (t.export.function || t.export.value_table))
            .map(|t| t.key.clone())
            .collect();

        for root in exported_roots {
            let mut seen_types = std::collections::HashSet::new();
            let mut type_stack = vec![root];
            let mut frontier_values = Vec::new();
            while let Some(key) = type_stack.pop() {
                if key.is_empty() || !seen_types.insert(key.clone()) {
                    continue;
                }
                if let Some(refs) = self.registry.type_value_refs.get(&key) {
                    frontier_values.extend(refs.iter().cloned());
                }
                if let Some(deps) = self.registry.type_deps.get(&key) {
                    type_stack.extend(deps.iter().cloned());
                }
            }

            let mut seen_values = std::collections::HashSet::new();
            let mut value_stack = frontier_values;
            while let Some(vkey) = value_stack.pop() {
                if !seen_values.insert(vkey.clone()) {
                    continue;
                }
                if let Some(&idx) = self.registry.value_index.get(&vkey) {
                    self.registry.values[idx].export.function = true;
                }
                if let Some(deps) = self.registry.value_deps.get(&vkey) {
                    value_stack.extend(deps.iter().cloned());
                }
            }
        }
    }
}

/// Wire-name synthesis for a canonical path with no conformance override
/// (§4.4 Phase 2 rules 2-4).
fn synth_wire_name(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() == 1 {
        return segments[0].replace('-', "_");
    }
    let root = segments[0].replace('-', "_");
    let last = *segments.last().unwrap();
    if last == "_item" {
        if segments.len() == 2 {
            format!("{root}_item")
        } else {
            let previous = segments[segments.len() - 2].replace('-', "_");
            format!("{root}_{previous}_item")
        }
    } else {
        format!("{root}_{}", last.replace('-', "_"))
    }
}

fn inherent_ftype(variant: &TypeVariant) -> (&'static str, &'static str) {
    match variant {
        TypeVariant::Boolean => ("FT_BOOLEAN", "BASE_NONE"),
        TypeVariant::Integer { .. } => ("FT_UINT32", "BASE_DEC"),
        TypeVariant::Enumerated { .. } => ("FT_UINT32", "BASE_DEC"),
        TypeVariant::Real => ("FT_DOUBLE", "BASE_NONE"),
        TypeVariant::Null => ("FT_NONE", "BASE_NONE"),
        TypeVariant::ObjectIdentifier => ("FT_OID", "BASE_NONE"),
        TypeVariant::ObjectDescriptor => ("FT_STRING", "BASE_NONE"),
        TypeVariant::OctetString => ("FT_BYTES", "BASE_NONE"),
        TypeVariant::BitString { .. } => ("FT_BYTES", "BASE_NONE"),
        TypeVariant::RestrictedString(_) | TypeVariant::UnrestrictedCharacterString => {
            ("FT_STRING", "BASE_NONE")
        }
        TypeVariant::GeneralizedTime | TypeVariant::UTCTime => ("FT_STRING", "BASE_NONE"),
        TypeVariant::Sequence { .. } | TypeVariant::Set { .. } | TypeVariant::Choice { .. } => {
            ("FT_NONE", "BASE_NONE")
        }
        TypeVariant::SequenceOf(_) | TypeVariant::SetOf(_) => ("FT_NONE", "BASE_NONE"),
        TypeVariant::Tagged(inner) => inherent_ftype(&inner.variant),
        TypeVariant::TypeRef(_) | TypeVariant::ExtTypeRef { .. } => ("FT_NONE", "BASE_NONE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    fn build_from(src: &str) -> (Registry, Vec<Diagnostic>) {
        let module = parse_module(src).expect("parse");
        let conformance = Conformance::default();
        build(&module, &conformance).expect("build")
    }

    #[test]
    fn integer_with_constraint_registers_one_type() {
        let (reg, _) = build_from("Foo DEFINITIONS ::= BEGIN Age ::= INTEGER (0..120) END");
        let entry = reg.type_entry("Age").expect("Age registered");
        assert_eq!(entry.wire_name, "Age");
        assert_eq!(entry.constraints[0].integer_bounds(), Some((0, 120)));
    }

    #[test]
    fn self_referential_sequence_detects_cycle() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            Tree ::= SEQUENCE { val INTEGER, children SEQUENCE OF Tree } \
            END";
        let (reg, diags) = build_from(src);
        assert!(reg.type_entry("Tree/children/_item").is_some());
        assert!(diags.iter().any(|d| matches!(d, Diagnostic::Cycle { .. })));
    }

    #[test]
    fn unknown_reference_becomes_dummy_import() {
        let src = "Foo DEFINITIONS ::= BEGIN Thing ::= External END";
        let (reg, diags) = build_from(src);
        assert!(reg.type_entry("xxx::External").is_some());
        assert!(diags.iter().any(|d| matches!(d, Diagnostic::DummyImport { .. })));
    }

    #[test]
    fn wire_name_collision_gets_suffix() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            A ::= SEQUENCE { item INTEGER } \
            B ::= SEQUENCE { item BOOLEAN } \
            END";
        let (reg, _) = build_from(src);
        let a_item = &reg.field_entry("A/item").unwrap().wire_name;
        let b_item = &reg.field_entry("B/item").unwrap().wire_name;
        assert_ne!(a_item, b_item);
    }

    #[test]
    fn conformance_rename_overrides_synthesis() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Message ::= BOOLEAN END").expect("parse");
        let mut conformance = Conformance::default();
        conformance.parse_text("#.TYPE_RENAME\nMessage Msg\n#.END\n").unwrap();
        let (reg, _) = build(&module, &conformance).expect("build");
        assert_eq!(reg.type_entry("Message").unwrap().wire_name, "Msg");
    }

    #[test]
    fn export_propagates_to_default_value_dependency() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            maxSize INTEGER ::= 10 \
            Thing ::= SEQUENCE { count INTEGER DEFAULT maxSize } \
            END";
        let module = parse_module(src).expect("parse");
        let mut conformance = Conformance::default();
        conformance.parse_text("#.EXPORTS\nThing WITH_VALS\n#.END\n").unwrap();
        let (reg, _) = build(&module, &conformance).expect("build");
        let value = reg.values.iter().find(|v| v.key == "maxSize").expect("maxSize registered");
        assert!(value.export.function, "exported type's default-value dependency should be exported too");
    }

    #[test]
    fn object_identifier_value_resolves_named_arcs() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            myOid OBJECT IDENTIFIER ::= { iso identified-organization 42 } \
            END";
        let (reg, _) = build_from(src);
        let value = reg.values.iter().find(|v| v.key == "myOid").expect("myOid registered");
        assert_eq!(value.resolved_oid, Some(vec![1, 3, 42]));
    }
}
