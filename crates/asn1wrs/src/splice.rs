//! Template splicer (component F): replaces `#include "fragment"` lines in
//! a template C/H file with the content of the fragment the emitter wrote,
//! then removes the fragment file.
//!
//! The line-level transform is pure ([`splice_text`]) so it can be unit
//! tested without touching disk; [`splice_files`] wraps it with the actual
//! file I/O the driver needs (§4.6, §5 "the splicer unlinks a fragment file
//! only after its contents have been fully copied and its source handle
//! closed").

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Rewrites `template`, replacing any `#include "name"` line whose `name`
/// is a key of `fragments` with
/// `/*--- Included file: name ---*/\n<contents>\n/*--- End of included file: name ---*/\n`.
/// Lines referencing a name absent from `fragments` pass through verbatim.
/// Returns the rewritten text and the fragment names actually spliced in,
/// in the order they were encountered.
#[must_use]
pub fn splice_text(template: &str, fragments: &FxHashMap<String, String>) -> (String, Vec<String>) {
    let mut out = String::with_capacity(template.len());
    let mut spliced = Vec::new();
    for line in template.lines() {
        match include_target(line).and_then(|name| fragments.get(name).map(|body| (name, body))) {
            Some((name, body)) => {
                out.push_str(&format!("/*--- Included file: {name} ---*/\n"));
                out.push_str(body);
                if !body.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&format!("/*--- End of included file: {name} ---*/\n"));
                spliced.push(name.to_string());
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    (out, spliced)
}

/// Parses a C preprocessor include directive (`#include "name"` or
/// `#include <name>`) and returns the referenced filename.
fn include_target(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#include")?.trim();
    let rest = rest.strip_prefix('"').or_else(|| rest.strip_prefix('<'))?;
    let end = rest.find(['"', '>'])?;
    Some(&rest[..end])
}

/// Splices `fragment_names` (the six sibling fragment filenames the
/// emitter may have written, sans directory) into `template_path`, writing
/// the result to `target_path`, then deletes every fragment file whose
/// content was actually consumed. Fragment files not referenced by the
/// template are left untouched.
pub fn splice_files(template_path: &Path, target_path: &Path, fragment_dir: &Path, fragment_names: &[String]) -> Result<()> {
    let template = fs::read_to_string(template_path).map_err(Error::Io)?;

    let mut fragments = FxHashMap::default();
    for name in fragment_names {
        let path = fragment_dir.join(name);
        if let Ok(contents) = fs::read_to_string(&path) {
            fragments.insert(name.clone(), contents);
        }
    }

    let (spliced_text, used) = splice_text(&template, &fragments);
    fs::write(target_path, spliced_text).map_err(Error::Io)?;

    for name in used {
        let _ = fs::remove_file(fragment_dir.join(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_include_and_deletes_nothing_in_memory() {
        let mut fragments = FxHashMap::default();
        fragments.insert("packet-P-hf.c".to_string(), "static int hf_P_Age;\n".to_string());
        let template = "before\n#include \"packet-P-hf.c\"\nafter\n";
        let (out, used) = splice_text(template, &fragments);
        assert!(out.contains("/*--- Included file: packet-P-hf.c ---*/"));
        assert!(out.contains("static int hf_P_Age;"));
        assert!(out.contains("/*--- End of included file: packet-P-hf.c ---*/"));
        assert_eq!(used, vec!["packet-P-hf.c".to_string()]);
    }

    #[test]
    fn unknown_include_passes_through_verbatim() {
        let fragments = FxHashMap::default();
        let template = "#include <stdio.h>\n";
        let (out, used) = splice_text(template, &fragments);
        assert_eq!(out, template);
        assert!(used.is_empty());
    }

    #[test]
    fn non_include_lines_are_untouched() {
        let fragments = FxHashMap::default();
        let template = "int main(void) {\n  return 0;\n}\n";
        let (out, _) = splice_text(template, &fragments);
        assert_eq!(out, template);
    }
}
