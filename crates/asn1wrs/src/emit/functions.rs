//! `packet-P-fn.c`: per-type value-string tables, element tables, and
//! dissector functions — the bulk of the emitter's output.

use super::{dissector_name, hf_name};
use crate::ast::{NamedNumber, TypeVariant};
use crate::conformance::Conformance;
use crate::config::{ApiStyle, Config, EncodingRule};
use crate::registry::{Registry, TypeEntry};

pub(super) fn emit_functions(registry: &Registry, config: &Config, conformance: &Conformance, header: &str) -> String {
    let mut out = header.to_string();

    emit_cycle_forward_declarations(registry, config, &mut out);

    for entry in &registry.types {
        if entry.is_import || entry.no_emit.function {
            continue;
        }
        let Some(variant) = &entry.variant else { continue };
        emit_value_string_table(config, entry, variant, &mut out);
        emit_element_table(registry, config, entry, variant, &mut out);
        emit_dissector_function(registry, config, conformance, entry, variant, &mut out);
    }
    out
}

fn emit_cycle_forward_declarations(registry: &Registry, config: &Config, out: &mut String) {
    for cycle in &registry.cycles {
        for key in cycle {
            let Some(entry) = registry.type_entry(key) else { continue };
            if entry.is_import {
                continue;
            }
            out.push_str(&format!("static {};\n", signature(config, &dissector_name(registry, config, key))));
        }
    }
    if !registry.cycles.is_empty() {
        out.push('\n');
    }
}

fn prim(config: &Config) -> &'static str {
    match config.encoding {
        EncodingRule::Ber => "ber",
        EncodingRule::Per => "per",
    }
}

fn value_string_var(config: &Config, wire_name: &str) -> String {
    format!("{}_vals", wire_name_with_protocol(config, wire_name))
}

fn wire_name_with_protocol(config: &Config, wire_name: &str) -> String {
    format!("{}_{wire_name}", config.protocol)
}

fn emit_value_string_table(config: &Config, entry: &TypeEntry, variant: &TypeVariant, out: &mut String) {
    let items: Option<Vec<(i64, String)>> = match variant {
        TypeVariant::Enumerated { items, extension_items, .. } => Some(
            items
                .iter()
                .chain(extension_items)
                .map(|n: &NamedNumber| (n.value, n.name.clone()))
                .collect(),
        ),
        TypeVariant::Integer { named } if !named.is_empty() => {
            Some(named.iter().map(|n| (n.value, n.name.clone())).collect())
        }
        TypeVariant::Choice { alternatives, .. } => Some(
            alternatives
                .iter()
                .enumerate()
                .map(|(i, (name, element))| {
                    let tag_num = element.ty.tag.map(|t| t.number as i64).unwrap_or(i as i64);
                    (tag_num, name.clone())
                })
                .collect(),
        ),
        _ => None,
    };
    let Some(items) = items else { return };
    let var = value_string_var(config, &entry.wire_name);
    out.push_str(&format!("static const value_string {var}[] = {{\n"));
    for (value, name) in &items {
        out.push_str(&format!("  {{ {value}, \"{name}\" }},\n"));
    }
    out.push_str("  { 0, NULL }\n};\n\n");
}

fn emit_element_table(
    registry: &Registry,
    config: &Config,
    entry: &TypeEntry,
    variant: &TypeVariant,
    out: &mut String,
) {
    match variant {
        TypeVariant::Sequence { elements, .. } | TypeVariant::Set { elements, .. } => {
            let var = format!("{}_sequence", wire_name_with_protocol(config, &entry.wire_name));
            out.push_str(&format!("static const ber_sequence_t {var}[] = {{\n"));
            for (name, element) in elements {
                let field_key = format!("{}/{name}", entry.key);
                let Some(field) = registry.field_entry(&field_key) else { continue };
                out.push_str(&format!(
                    "  {{ &{hf}, BER_CLASS_CON, -1, {flags}, {fn_name} }},\n",
                    hf = hf_name(config, &field.wire_name),
                    flags = if element.optional { "BER_FLAGS_OPTIONAL" } else { "BER_FLAGS_NOOWNTAG" },
                    fn_name = dissector_name(registry, config, &field.type_key),
                ));
            }
            out.push_str("  { NULL, 0, 0, 0, NULL }\n};\n\n");
        }
        TypeVariant::Choice { alternatives, extensible } => {
            let var = format!("{}_choice", wire_name_with_protocol(config, &entry.wire_name));
            out.push_str(&format!("static const per_choice_t {var}[] = {{\n"));
            for (idx, (name, element)) in alternatives.iter().enumerate() {
                let field_key = format!("{}/{name}", entry.key);
                let Some(field) = registry.field_entry(&field_key) else { continue };
                let ext_flag = if *extensible { "ASN1_EXTENSION_ROOT" } else { "ASN1_NO_EXTENSIONS" };
                out.push_str(&format!(
                    "  {{ {idx:3}, &{hf}, {ext_flag}, {fn_name} }},\n",
                    hf = hf_name(config, &field.wire_name),
                    fn_name = dissector_name(registry, config, &field.type_key),
                ));
                let _ = element;
            }
            out.push_str("  { 0, NULL, 0, NULL }\n};\n\n");
        }
        _ => {}
    }
}

fn emit_dissector_function(
    registry: &Registry,
    config: &Config,
    conformance: &Conformance,
    entry: &TypeEntry,
    variant: &TypeVariant,
    out: &mut String,
) {
    let fn_name = dissector_name(registry, config, &entry.key);
    let storage = if entry.export.function { "" } else { "static " };

    log_discarded_constraints(entry);

    if entry.user_defined.function {
        out.push_str(&format!("{};\n\n", signature(config, &fn_name)));
        return;
    }

    out.push_str(&format!("{storage}{} {{\n", signature(config, &fn_name)));

    if let Some(hdr) = conformance.fn_hdr_for(&entry.wire_name) {
        out.push_str(hdr);
        out.push('\n');
    }

    if let Some(body) = conformance.fn_body_for(&entry.wire_name) {
        out.push_str(body);
        out.push('\n');
    } else {
        out.push_str(&render_body(registry, config, entry, variant));
    }

    if let Some(ftr) = conformance.fn_ftr_for(&entry.wire_name) {
        out.push_str(ftr);
        out.push('\n');
    }

    out.push_str("  return offset;\n}\n\n");
}

/// The packet-info parameter `signature()` declares for `config.api`:
/// `asn1_ctx_t *actx` for the new API, `packet_info *pinfo` for the legacy
/// one. `render_body` must reference the same identifier its own
/// `signature()` call declared, or the emitted body won't compile.
fn ctx_param(config: &Config) -> &'static str {
    match config.api {
        ApiStyle::Legacy => "pinfo",
        ApiStyle::New => "actx",
    }
}

fn render_body(registry: &Registry, config: &Config, entry: &TypeEntry, variant: &TypeVariant) -> String {
    let p = prim(config);
    let ctx = ctx_param(config);
    match variant {
        TypeVariant::Boolean => format!("  offset = dissect_{p}_boolean(tvb, offset, {ctx}, tree, hf_index, NULL);\n"),
        TypeVariant::Integer { .. } => {
            if let Some((lo, hi)) = entry.constraints.iter().find_map(|c| c.integer_bounds()) {
                format!(
                    "  offset = dissect_{p}_constrained_integer(tvb, offset, {ctx}, tree, hf_index, {lo}U, {hi}U, FALSE, NULL);\n"
                )
            } else {
                format!("  offset = dissect_{p}_integer(tvb, offset, {ctx}, tree, hf_index, NULL);\n")
            }
        }
        TypeVariant::Enumerated { items, extensible, extension_items } => {
            let max = items.len().saturating_sub(1).max(0);
            format!(
                "  offset = dissect_{p}_enumerated(tvb, offset, {ctx}, tree, hf_index, {max}U, {ext}, NULL);\n",
                ext = if *extensible || !extension_items.is_empty() { "TRUE" } else { "FALSE" },
            )
        }
        TypeVariant::Real => format!("  offset = dissect_{p}_real(tvb, offset, {ctx}, tree, hf_index, NULL);\n"),
        TypeVariant::Null => format!("  offset = dissect_{p}_null(tvb, offset, {ctx}, tree, hf_index);\n"),
        TypeVariant::ObjectIdentifier => {
            format!("  offset = dissect_{p}_object_identifier(tvb, offset, {ctx}, tree, hf_index, NULL);\n")
        }
        TypeVariant::ObjectDescriptor => {
            format!("  offset = dissect_{p}_object_descriptor(tvb, offset, {ctx}, tree, hf_index);\n")
        }
        TypeVariant::OctetString => {
            let (min, max) = size_bounds(entry);
            format!("  offset = dissect_{p}_octet_string(tvb, offset, {ctx}, tree, hf_index, {min}, {max}, NULL);\n")
        }
        TypeVariant::BitString { .. } => {
            let (min, max) = size_bounds(entry);
            format!("  offset = dissect_{p}_bit_string(tvb, offset, {ctx}, tree, hf_index, {min}, {max}, NULL, NULL);\n")
        }
        TypeVariant::RestrictedString(_) | TypeVariant::UnrestrictedCharacterString => {
            let (min, max) = size_bounds(entry);
            format!("  offset = dissect_{p}_restricted_character_string(tvb, offset, {ctx}, tree, hf_index, {min}, {max});\n")
        }
        TypeVariant::GeneralizedTime => {
            format!("  offset = dissect_{p}_generalized_time(tvb, offset, {ctx}, tree, hf_index);\n")
        }
        TypeVariant::UTCTime => format!("  offset = dissect_{p}_utc_time(tvb, offset, {ctx}, tree, hf_index);\n"),
        TypeVariant::Sequence { extensible, .. } => {
            let tbl = format!("{}_sequence", wire_name_with_protocol(config, &entry.wire_name));
            format!(
                "  offset = dissect_{p}_sequence(tvb, offset, {ctx}, tree, hf_index, ett_{proto}_{wn}, {tbl}, {ext});\n",
                proto = config.protocol,
                wn = entry.wire_name,
                ext = if *extensible { "TRUE" } else { "FALSE" },
            )
        }
        TypeVariant::Set { extensible, .. } => {
            let tbl = format!("{}_sequence", wire_name_with_protocol(config, &entry.wire_name));
            format!(
                "  offset = dissect_{p}_set(tvb, offset, {ctx}, tree, hf_index, ett_{proto}_{wn}, {tbl}, {ext});\n",
                proto = config.protocol,
                wn = entry.wire_name,
                ext = if *extensible { "TRUE" } else { "FALSE" },
            )
        }
        TypeVariant::Choice { extensible, .. } => {
            let tbl = format!("{}_choice", wire_name_with_protocol(config, &entry.wire_name));
            format!(
                "  offset = dissect_{p}_choice(tvb, offset, {ctx}, tree, hf_index, ett_{proto}_{wn}, {tbl}, {ext});\n",
                proto = config.protocol,
                wn = entry.wire_name,
                ext = if *extensible { "TRUE" } else { "FALSE" },
            )
        }
        TypeVariant::SequenceOf(_) | TypeVariant::SetOf(_) => {
            let item_key = format!("{}/_item", entry.key);
            let item_fn = dissector_name(registry, config, &item_key);
            let (min, max) = size_bounds(entry);
            format!(
                "  offset = dissect_{p}_sequence_of(tvb, offset, {ctx}, tree, hf_index, {min}, {max}, {item_fn});\n"
            )
        }
        TypeVariant::Tagged(_) => {
            let inner_key = format!("{}/_tag", entry.key);
            let inner_fn = dissector_name(registry, config, &inner_key);
            format!("  offset = {inner_fn}(tvb, offset, {ctx}, tree, hf_index);\n")
        }
        TypeVariant::TypeRef(_) | TypeVariant::ExtTypeRef { .. } => {
            let target = registry.type_deps.get(&entry.key).and_then(|d| d.first()).cloned().unwrap_or_default();
            let target_fn = dissector_name(registry, config, &target);
            format!("  offset = {target_fn}(tvb, offset, {ctx}, tree, hf_index);\n")
        }
    }
}

fn size_bounds(entry: &TypeEntry) -> (i64, i64) {
    entry
        .constraints
        .iter()
        .find_map(|c| c.integer_bounds())
        .unwrap_or((-1, -1))
}

/// `integer_bounds` is the only constraint reader the emitter calls, and it
/// only recognises `ValueRange`/`Size(ValueRange)`. Everything else a type
/// carries (`InnerType`, `PermittedAlphabet`, `ContainedSubtype`,
/// `UserDefined`, bare `SingleValue`, `Pattern`) parses fine but has no
/// effect on the generated dissector body, so note it rather than drop it
/// silently.
fn log_discarded_constraints(entry: &TypeEntry) {
    for constraint in &entry.constraints {
        if constraint.integer_bounds().is_none() {
            log::debug!(
                "constraint {:?} on {} discarded at emission (no reader for this kind)",
                constraint.kind,
                entry.wire_name,
            );
        }
    }
}

pub(super) fn signature(config: &Config, fn_name: &str) -> String {
    let params = match (config.api, config.encoding) {
        (ApiStyle::Legacy, EncodingRule::Ber) => {
            "gboolean implicit_tag, tvbuff_t *tvb, int offset, packet_info *pinfo, proto_tree *tree, int hf_index".to_string()
        }
        (ApiStyle::Legacy, EncodingRule::Per) => {
            "tvbuff_t *tvb, int offset, packet_info *pinfo, proto_tree *tree, int hf_index".to_string()
        }
        (ApiStyle::New, EncodingRule::Ber) => {
            "gboolean implicit_tag, tvbuff_t *tvb, int offset, asn1_ctx_t *actx, proto_tree *tree, int hf_index, proto_item **item, void *private_data".to_string()
        }
        (ApiStyle::New, EncodingRule::Per) => {
            "tvbuff_t *tvb, int offset, asn1_ctx_t *actx, proto_tree *tree, int hf_index, proto_item **item, void *private_data".to_string()
        }
    };
    format!("int {fn_name}({params})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    fn build(src: &str) -> Registry {
        let module = parse_module(src).unwrap();
        let conformance = Conformance::default();
        crate::registry::build(&module, &conformance).unwrap().0
    }

    #[test]
    fn s1_integer_with_constraint() {
        let registry = build("Foo DEFINITIONS ::= BEGIN Age ::= INTEGER (0..120) END");
        let config = Config::new("P");
        let conformance = Conformance::default();
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("dissect_P_Age"));
        assert!(body.contains("dissect_per_constrained_integer(tvb, offset, actx, tree, hf_index, 0U, 120U, FALSE, NULL)"));
        assert!(!body.contains("value_string"));
    }

    #[test]
    fn s2_choice_with_two_alternatives() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            Msg ::= CHOICE { hello [0] IA5String, goodbye [1] IA5String } \
            END";
        let registry = build(src);
        let config = Config::new("P");
        let conformance = Conformance::default();
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("{ 0, \"hello\" }"));
        assert!(body.contains("{ 1, \"goodbye\" }"));
        assert!(body.contains("Msg_choice"));
        assert!(body.contains("ASN1_NO_EXTENSIONS"));
        assert!(body.contains("dissect_per_choice"));
    }

    #[test]
    fn s4_enumerated_with_extension_marker() {
        let registry = build("Foo DEFINITIONS ::= BEGIN Color ::= ENUMERATED { red, green, blue, ... } END");
        let config = Config::new("P");
        let conformance = Conformance::default();
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("{ 0, \"red\" }"));
        assert!(body.contains("{ 2, \"blue\" }"));
        assert!(body.contains("dissect_per_enumerated(tvb, offset, actx, tree, hf_index, 2U, TRUE, NULL)"));
    }

    #[test]
    fn s5_conformance_rename_and_body_override() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Message ::= BOOLEAN END").unwrap();
        let mut conformance = Conformance::default();
        conformance
            .parse_text("#.TYPE_RENAME\nMessage Msg\n#.FN_BODY\nMsg\n  /*custom*/\n#.END\n")
            .unwrap();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let config = Config::new("P");
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("dissect_P_Msg"));
        assert!(body.contains("/*custom*/"));
    }

    #[test]
    fn s6_unknown_reference_calls_dummy_dissector() {
        let registry = build("Foo DEFINITIONS ::= BEGIN Thing ::= External END");
        let config = Config::new("P");
        let conformance = Conformance::default();
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("dissect_xxx_External"));
    }

    #[test]
    fn pattern_constraint_has_no_reader_and_is_flagged_as_discarded() {
        let registry = build("Foo DEFINITIONS ::= BEGIN Name ::= IA5String (PATTERN \"[a-z]+\") END");
        let entry = registry.types.iter().find(|t| t.key == "Name").unwrap();
        assert!(entry.constraints[0].integer_bounds().is_none());
        // Not asserting on log output directly (no subscriber installed in
        // tests); this confirms the condition `log_discarded_constraints`
        // keys off actually holds for a PATTERN constraint.
    }

    #[test]
    fn legacy_api_body_references_pinfo_not_actx() {
        let registry = build("Foo DEFINITIONS ::= BEGIN Age ::= INTEGER (0..120) END");
        let mut config = Config::new("P");
        config.api = ApiStyle::Legacy;
        let conformance = Conformance::default();
        let body = emit_functions(&registry, &config, &conformance, "");
        assert!(body.contains("packet_info *pinfo"));
        assert!(body.contains("dissect_per_constrained_integer(tvb, offset, pinfo, tree, hf_index, 0U, 120U, FALSE, NULL)"));
        assert!(!body.contains("actx"));
    }
}
