//! Command-line driver for the ASN.1-to-dissector compiler (component G).
//!
//! Hand-parses `std::env::args()` against the exact flag table in the
//! specification rather than pulling in an argument-parsing crate — this
//! workspace's other binaries construct their configuration directly in
//! `main` too.

use std::process::ExitCode;

use anyhow::{Context, Result};
use asn1wrs::{ApiStyle, CompileRequest, Config, DebugFlags, EncodingRule};

fn main() -> ExitCode {
    env_logger::init();
    let argv: Vec<String> = std::env::args().collect();
    match run(&argv) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [-b] [-X] [-p NAME] [-o NAME] [-c FILE]... [-e] [-s STEM] [-d CHARS] INPUT.asn1\n\
         \n\
         \x20 -h, -?       show this usage and exit\n\
         \x20 -b           encoding = BER (default PER)\n\
         \x20 -X           legacy dissector API (default: new API)\n\
         \x20 -p NAME      protocol name (default: input basename, lowercased)\n\
         \x20 -o NAME      output file stem (default: protocol name)\n\
         \x20 -c FILE      read conformance file (may repeat)\n\
         \x20 -e           also emit *-exp.h / *-exp.cnf\n\
         \x20 -s STEM      splice generated fragments into STEM.c / STEM.h\n\
         \x20 -d CHARS     debug flags (l=lex, y=yacc, s=AST, a=assignments, t=tables)\n"
    )
}

/// Parses argv and runs the pipeline end to end, returning the process
/// exit code on success (0, or 2 for a usage error the caller already
/// reported via [`Error::Usage`](UsageExit)).
fn run(argv: &[String]) -> Result<ExitCode> {
    let program = argv.first().map(String::as_str).unwrap_or("asn1wrs");

    let mut protocol: Option<String> = None;
    let mut output_stem: Option<String> = None;
    let mut conformance_files = Vec::new();
    let mut encoding = EncodingRule::Per;
    let mut api = ApiStyle::New;
    let mut emit_exports = false;
    let mut splice_stem = None;
    let mut debug = DebugFlags::default();
    let mut input: Option<String> = None;

    let mut args = argv.iter().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "-?" => {
                print!("{}", usage(program));
                return Ok(ExitCode::from(2));
            }
            "-b" => encoding = EncodingRule::Ber,
            "-X" => api = ApiStyle::Legacy,
            "-e" => emit_exports = true,
            "-p" => protocol = Some(next_value(&mut args, "-p")?),
            "-o" => output_stem = Some(next_value(&mut args, "-o")?),
            "-c" => conformance_files.push(next_value(&mut args, "-c")?),
            "-s" => splice_stem = Some(next_value(&mut args, "-s")?),
            "-d" => debug = DebugFlags::parse(&next_value(&mut args, "-d")?),
            other if other.starts_with('-') && other.len() > 1 => {
                eprint!("{}", usage(program));
                anyhow::bail!("unrecognised option {other:?}");
            }
            positional => {
                if input.is_some() {
                    eprint!("{}", usage(program));
                    anyhow::bail!("unexpected extra argument {positional:?}");
                }
                input = Some(positional.to_string());
            }
        }
    }

    let Some(input_path) = input else {
        eprint!("{}", usage(program));
        return Ok(ExitCode::from(2));
    };

    let protocol = protocol.unwrap_or_else(|| Config::protocol_name_from_path(&input_path));
    let mut config = Config::new(protocol);
    config.output_stem = output_stem.unwrap_or_else(|| config.protocol.clone());
    config.encoding = encoding;
    config.api = api;
    config.conformance_files = conformance_files;
    config.emit_exports = emit_exports;
    config.splice_stem = splice_stem;
    config.debug = debug;

    let source = std::fs::read_to_string(&input_path).with_context(|| format!("reading {input_path}"))?;
    let request = CompileRequest {
        config: config.clone(),
        input_filename: input_path.clone(),
        source,
        argv: argv.to_vec(),
    };

    let output = asn1wrs::compile(&request)?;
    for diagnostic in &output.diagnostics {
        log::warn!("{diagnostic}");
    }

    let out_dir = std::env::current_dir().context("resolving output directory")?;
    let mut written = Vec::new();
    for (name, contents) in output.emitted.files(&config.output_stem) {
        let path = out_dir.join(&name);
        std::fs::write(&path, contents).with_context(|| format!("writing {name}"))?;
        written.push(name);
    }

    if let Some(stem) = &config.splice_stem {
        for ext in ["c", "h"] {
            let template = out_dir.join(format!("{stem}.{ext}.tmpl"));
            if !template.exists() {
                continue;
            }
            let target = out_dir.join(format!("{stem}.{ext}"));
            asn1wrs::splice::splice_files(&template, &target, &out_dir, &written)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn next_value<'a, I: Iterator<Item = &'a String>>(args: &mut std::iter::Peekable<I>, flag: &str) -> Result<String> {
    args.next().cloned().ok_or_else(|| anyhow::anyhow!("option {flag} requires a value"))
}
