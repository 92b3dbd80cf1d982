//! Code-emission layer: renders the resolved registry into the six sibling
//! C fragment files.

mod export;
mod ett;
mod functions;
mod hf;

use crate::conformance::Conformance;
use crate::config::Config;
use crate::registry::Registry;

/// The named fragment files one invocation may produce. A file whose body
/// would be empty is omitted entirely (§4.5).
#[derive(Debug, Default)]
pub struct EmitOutput {
    pub hf_c: Option<String>,
    pub hfarr_c: Option<String>,
    pub ett_c: Option<String>,
    pub ettarr_c: Option<String>,
    pub fn_c: Option<String>,
    pub exp_h: Option<String>,
    pub exp_cnf: Option<String>,
}

impl EmitOutput {
    /// Returns `(filename, contents)` pairs for every non-empty fragment.
    pub fn files(&self, stem: &str) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        if let Some(s) = &self.hf_c {
            out.push((format!("packet-{stem}-hf.c"), s.as_str()));
        }
        if let Some(s) = &self.hfarr_c {
            out.push((format!("packet-{stem}-hfarr.c"), s.as_str()));
        }
        if let Some(s) = &self.ett_c {
            out.push((format!("packet-{stem}-ett.c"), s.as_str()));
        }
        if let Some(s) = &self.ettarr_c {
            out.push((format!("packet-{stem}-ettarr.c"), s.as_str()));
        }
        if let Some(s) = &self.fn_c {
            out.push((format!("packet-{stem}-fn.c"), s.as_str()));
        }
        if let Some(s) = &self.exp_h {
            out.push((format!("packet-{stem}-exp.h"), s.as_str()));
        }
        if let Some(s) = &self.exp_cnf {
            out.push((format!("packet-{stem}-exp.cnf"), s.as_str()));
        }
        out
    }
}

/// Builds the fixed auto-generated header every fragment file opens with.
pub(crate) fn file_header(input_filename: &str, argv: &[String]) -> String {
    format!(
        "/* Generated automatically by the ASN.1 to Wireshark dissector compiler.\n \
         * Input file: {input_filename}\n \
         * Invocation: {argv}\n \
         * Generated on: {timestamp}\n \
         * DO NOT EDIT\n \
         */\n\n",
        argv = argv.join(" "),
        timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Renders every fragment file for `registry` under `config`.
pub fn emit(registry: &Registry, config: &Config, conformance: &Conformance, input_filename: &str, argv: &[String]) -> EmitOutput {
    let header = file_header(input_filename, argv);

    let hf_c = hf::emit_hf(registry, config, &header);
    let hfarr_c = hf::emit_hfarr(registry, config, &header);
    let ett_c = ett::emit_ett(registry, config, &header);
    let ettarr_c = ett::emit_ettarr(registry, config, &header);
    let fn_c = functions::emit_functions(registry, config, conformance, &header);

    let (exp_h, exp_cnf) = if config.emit_exports {
        let (h, cnf) = export::emit_export(registry, config, &header);
        (Some(h), Some(cnf))
    } else {
        (None, None)
    };

    EmitOutput {
        hf_c: non_empty(hf_c),
        hfarr_c: non_empty(hfarr_c),
        ett_c: non_empty(ett_c),
        ettarr_c: non_empty(ettarr_c),
        fn_c: non_empty(fn_c),
        exp_h,
        exp_cnf,
    }
}

fn non_empty(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

/// The C dissector-function name for a type entry: `dissect_<protocol>_<T>`
/// for a locally-defined type, `dissect_<importedprotocol>_<name>` for an
/// import (real or dummy).
pub(crate) fn dissector_name(registry: &Registry, config: &Config, type_key: &str) -> String {
    match registry.type_entry(type_key) {
        Some(entry) if entry.is_import => {
            let bare = type_key.rsplit("::").next().unwrap_or(type_key);
            format!("dissect_{}_{bare}", entry.originating_module.as_deref().unwrap_or("xxx"))
        }
        Some(entry) => format!("dissect_{}_{}", config.protocol, entry.wire_name),
        None => format!("dissect_{}_{}", config.protocol, type_key.replace(['/', ':'], "_")),
    }
}

/// The `hf_<protocol>_<wirename>` header-field variable name for a field.
pub(crate) fn hf_name(config: &Config, field_wire_name: &str) -> String {
    format!("hf_{}_{field_wire_name}", config.protocol)
}

/// The `ett_<protocol>_<wirename>` subtree variable name for a type.
pub(crate) fn ett_name(config: &Config, type_wire_name: &str) -> String {
    format!("ett_{}_{type_wire_name}", config.protocol)
}
