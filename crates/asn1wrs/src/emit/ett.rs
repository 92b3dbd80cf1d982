//! `packet-P-ett.c` / `packet-P-ettarr.c`: subtree handle declarations and
//! the registration array consumed by `proto_register_subtree_array`.

use super::ett_name;
use crate::ast::TypeVariant;
use crate::config::Config;
use crate::registry::Registry;

fn constructed_type_wire_names(registry: &Registry) -> Vec<&str> {
    registry
        .types
        .iter()
        .filter(|t| !t.is_import)
        .filter(|t| {
            matches!(
                t.variant,
                Some(TypeVariant::Sequence { .. }) | Some(TypeVariant::Set { .. }) | Some(TypeVariant::Choice { .. })
            )
        })
        .map(|t| t.wire_name.as_str())
        .collect()
}

pub(super) fn emit_ett(registry: &Registry, config: &Config, header: &str) -> String {
    let names = constructed_type_wire_names(registry);
    if names.is_empty() {
        return String::new();
    }
    let mut out = header.to_string();
    for name in names {
        out.push_str(&format!("static gint {};\n", ett_name(config, name)));
    }
    out
}

pub(super) fn emit_ettarr(registry: &Registry, config: &Config, header: &str) -> String {
    let names = constructed_type_wire_names(registry);
    if names.is_empty() {
        return String::new();
    }
    let mut out = header.to_string();
    for name in names {
        out.push_str(&format!("    &{},\n", ett_name(config, name)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::Conformance;
    use crate::parser::parse_module;

    #[test]
    fn choice_gets_subtree_handle() {
        let src = "Foo DEFINITIONS ::= BEGIN \
            Msg ::= CHOICE { hello [0] IA5String, goodbye [1] IA5String } \
            END";
        let module = parse_module(src).unwrap();
        let conformance = Conformance::default();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let config = Config::new("P");
        assert!(emit_ett(&registry, &config, "").contains("ett_P_Msg"));
    }
}
