//! `packet-P-exp.h` / `packet-P-exp.cnf`: the export surface other
//! dissectors can build against when `-e` is given (§6.1, §4.5).

use super::dissector_name;
use super::functions::signature;
use crate::config::Config;
use crate::registry::Registry;

/// Renders the header declaring every exported dissector function plus the
/// conformance snippet (`#.MODULE_IMPORT`-shaped) another module's
/// conformance file can `#.INCLUDE` to pick those declarations up.
pub(super) fn emit_export(registry: &Registry, config: &Config, header: &str) -> (String, String) {
    let mut h = header.to_string();
    let mut cnf = header.to_string();

    let mut any = false;
    for name in &registry.assignments {
        let Some(entry) = registry.type_entry(name) else { continue };
        if entry.is_import || entry.no_emit.function || !entry.export.function {
            continue;
        }
        any = true;
        let fn_name = dissector_name(registry, config, &entry.key);
        h.push_str(&format!("extern {};\n", signature(config, &fn_name)));
        cnf.push_str(&format!("#.MODULE_IMPORT\n{proto} {proto}\n", proto = config.protocol));
    }

    if !any {
        return (String::new(), String::new());
    }
    (h, cnf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::Conformance;
    use crate::parser::parse_module;

    #[test]
    fn exported_type_gets_extern_declaration() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Message ::= BOOLEAN END").unwrap();
        let mut conformance = Conformance::default();
        conformance.parse_text("#.EXPORTS\nMessage WITH_VALS\n#.END\n").unwrap();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let config = Config::new("P");
        let (h, _cnf) = emit_export(&registry, &config, "");
        assert!(h.contains("extern int dissect_P_Message"));
    }

    #[test]
    fn legacy_ber_export_matches_functions_signature() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Message ::= BOOLEAN END").unwrap();
        let mut conformance = Conformance::default();
        conformance.parse_text("#.EXPORTS\nMessage WITH_VALS\n#.END\n").unwrap();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let mut config = Config::new("P");
        config.api = crate::config::ApiStyle::Legacy;
        config.encoding = crate::config::EncodingRule::Ber;
        let (h, _cnf) = emit_export(&registry, &config, "");
        assert!(h.contains("extern int dissect_P_Message(gboolean implicit_tag, tvbuff_t *tvb, int offset, packet_info *pinfo, proto_tree *tree, int hf_index);"));
        assert!(!h.contains("actx"));
    }

    #[test]
    fn nothing_exported_produces_empty_files() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Message ::= BOOLEAN END").unwrap();
        let conformance = Conformance::default();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let config = Config::new("P");
        let (h, cnf) = emit_export(&registry, &config, "");
        assert!(h.is_empty());
        assert!(cnf.is_empty());
    }
}
