//! `packet-P-hf.c` / `packet-P-hfarr.c`: header-field declarations and the
//! registration array consumed by `proto_register_field_array`.

use super::hf_name;
use crate::config::Config;
use crate::registry::{Attrs, Registry};

struct Row {
    var: String,
    display_name: String,
    abbrev: String,
    attrs: Attrs,
}

fn collect_rows(registry: &Registry, config: &Config) -> Vec<Row> {
    let mut rows = Vec::new();
    for name in &registry.assignments {
        let Some(entry) = registry.type_entry(name) else { continue };
        if entry.no_emit.function {
            continue;
        }
        rows.push(Row {
            var: hf_name(config, &entry.wire_name),
            display_name: entry.wire_name.replace('_', " "),
            abbrev: format!("{}.{}", config.protocol, entry.wire_name.to_ascii_lowercase()),
            attrs: entry.attrs.clone(),
        });
    }
    for field in &registry.fields {
        let abbrev = field.attrs.abbrev.clone().unwrap_or_else(|| field.wire_name.clone());
        rows.push(Row {
            var: hf_name(config, &field.wire_name),
            display_name: field.local_name.replace('-', " "),
            abbrev: format!("{}.{}", config.protocol, abbrev.to_ascii_lowercase()),
            attrs: field.attrs.clone(),
        });
    }
    rows
}

pub(super) fn emit_hf(registry: &Registry, config: &Config, header: &str) -> String {
    let rows = collect_rows(registry, config);
    if rows.is_empty() {
        return String::new();
    }
    let mut out = header.to_string();
    for row in &rows {
        out.push_str(&format!("static int {};\n", row.var));
    }
    out
}

pub(super) fn emit_hfarr(registry: &Registry, config: &Config, header: &str) -> String {
    let rows = collect_rows(registry, config);
    if rows.is_empty() {
        return String::new();
    }
    let mut out = header.to_string();
    for row in &rows {
        let strings = row.attrs.strings.clone().unwrap_or_else(|| "NULL".to_string());
        let blurb = row.attrs.blurb.clone().unwrap_or_else(|| "NULL".to_string());
        out.push_str(&format!(
            "    {{ &{var}, {{ \"{name}\", \"{abbrev}\", {ftype}, {display}, {strings}, {bitmask}, {blurb}, HFILL }}}},\n",
            var = row.var,
            name = row.display_name,
            abbrev = row.abbrev,
            ftype = row.attrs.ftype,
            display = row.attrs.display,
            strings = strings,
            bitmask = row.attrs.bitmask,
            blurb = blurb,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::Conformance;
    use crate::parser::parse_module;

    #[test]
    fn integer_gets_uint32_base_dec_hf_row() {
        let module = parse_module("Foo DEFINITIONS ::= BEGIN Age ::= INTEGER (0..120) END").unwrap();
        let conformance = Conformance::default();
        let (registry, _) = crate::registry::build(&module, &conformance).unwrap();
        let config = Config::new("P");
        let body = emit_hfarr(&registry, &config, "");
        assert!(body.contains("hf_P_Age"));
        assert!(body.contains("FT_UINT32"));
        assert!(body.contains("BASE_DEC"));
        assert!(body.contains("NULL"));
    }
}
