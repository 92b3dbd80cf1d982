//! Compiler-wide configuration, threaded through the registry and emitter.

/// Encoding rule the generated dissector targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRule {
    Ber,
    Per,
}

impl Default for EncodingRule {
    fn default() -> Self {
        Self::Per
    }
}

/// Dissector API generation the emitter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStyle {
    Legacy,
    New,
}

impl Default for ApiStyle {
    fn default() -> Self {
        Self::New
    }
}

/// Lex/parse/registry debug trace selectors, set from `-d CHARS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub lex: bool,
    pub yacc: bool,
    pub ast: bool,
    pub assignments: bool,
    pub tables: bool,
}

impl DebugFlags {
    /// Parses the `-d` option's character set (`l`, `y`, `s`, `a`, `t`).
    #[must_use]
    pub fn parse(chars: &str) -> Self {
        let mut flags = Self::default();
        for c in chars.chars() {
            match c {
                'l' => flags.lex = true,
                'y' => flags.yacc = true,
                's' => flags.ast = true,
                'a' => flags.assignments = true,
                't' => flags.tables = true,
                _ => {}
            }
        }
        flags
    }
}

/// Full compiler configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub encoding: EncodingRule,
    pub api: ApiStyle,
    /// Dissector protocol short name (`P` in the function-naming scheme).
    pub protocol: String,
    /// Output file stem; defaults to `protocol`.
    pub output_stem: String,
    /// Conformance files to load, in command-line order.
    pub conformance_files: Vec<String>,
    /// Emit `*-exp.h` / `*-exp.cnf` export surfaces.
    pub emit_exports: bool,
    /// Splice fragments into `STEM.c` / `STEM.h` when set.
    pub splice_stem: Option<String>,
    pub debug: DebugFlags,
}

impl Config {
    #[must_use]
    pub fn new(protocol: impl Into<String>) -> Self {
        let protocol = protocol.into();
        Self {
            encoding: EncodingRule::default(),
            api: ApiStyle::default(),
            output_stem: protocol.clone(),
            protocol,
            conformance_files: Vec::new(),
            emit_exports: false,
            splice_stem: None,
            debug: DebugFlags::default(),
        }
    }

    /// Derives the default protocol name from an input file path: the
    /// basename, lowercased, with its extension stripped.
    #[must_use]
    pub fn protocol_name_from_path(path: &str) -> String {
        let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
        stem.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_name_strips_dir_and_extension() {
        assert_eq!(Config::protocol_name_from_path("dir/Sub/MyProto.asn1"), "myproto");
        assert_eq!(Config::protocol_name_from_path("Plain.asn"), "plain");
    }

    #[test]
    fn debug_flags_parse_known_chars() {
        let f = DebugFlags::parse("lat");
        assert!(f.lex && f.assignments && f.tables);
        assert!(!f.yacc && !f.ast);
    }

    #[test]
    fn defaults_are_per_and_new() {
        let c = Config::new("p");
        assert_eq!(c.encoding, EncodingRule::Per);
        assert_eq!(c.api, ApiStyle::New);
        assert_eq!(c.output_stem, "p");
    }
}
