//! Preprocessor that rewrites legacy AsciiDoc markup into the stricter
//! dialect Asciidoctor expects.
//!
//! Reads a document from a file (or stdin) and writes the rewritten lines to
//! stdout (or `--output`). Warnings go to the log; set `RUST_LOG=warn` or
//! lower to see them. Documents using CRLF line endings are written back
//! with CRLF.

mod config;
mod diag;
mod include;
mod preprocess;
mod reader;
mod rewrite;

use clap::{Arg, Command};
use config::Config;
use diag::LogSink;
use include::TaggedRegionResolver;
use log::{debug, info};
use preprocess::Preprocessor;
use reader::Reader;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Main entrypoint for the filter.
fn main() -> Result<(), Error> {
    env_logger::init();
    let matches = Command::new("asciidoc-compat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rewrite legacy AsciiDoc markup for a strict converter")
        .arg(
            Arg::new("input")
                .help("Document to preprocess (stdin if omitted)")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the result (stdout if omitted)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("base-dir")
                .long("base-dir")
                .help("Directory that tagged includes resolve against"),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    if let Some(dir) = matches.get_one::<String>("base-dir") {
        config.base_dir = Some(PathBuf::from(dir));
    }
    debug!("configuration {:?}", config);

    let input = matches.get_one::<String>("input").map(String::as_str);
    let text = read_input(input)?;
    let output = preprocess(&text, input, &config);

    match matches.get_one::<String>("output") {
        Some(path) => std::fs::write(path, &output)
            .map_err(|e| format!("Failed to write output file '{}': {:?}", path, e))?,
        None => std::io::stdout()
            .write_all(output.as_bytes())
            .map_err(|e| format!("Failed to write output: {:?}", e))?,
    }
    Ok(())
}

/// Local error type.
#[derive(Debug)]
pub enum Error {
    General(String),
}

impl From<String> for Error {
    fn from(e: String) -> Error {
        Self::General(e)
    }
}

fn read_input(path: Option<&str>) -> Result<String, Error> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read input file '{}': {:?}", path, e).into()),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Failed to read stdin: {:?}", e))?;
            Ok(text)
        }
    }
}

/// Run one document through a fresh preprocessor.
fn preprocess(text: &str, file: Option<&str>, config: &Config) -> String {
    let mut reader = Reader::from_text(text, file);
    let mut resolver = TaggedRegionResolver::new(config.base_dir.clone(), config.dedent)
        .with_max_depth(config.max_include_depth);
    let mut sink = LogSink::default();
    let lines = Preprocessor::new().run(&mut reader, &mut resolver, &mut sink);
    info!(
        "preprocessed {} into {} lines, {} warnings",
        file.unwrap_or("<stdin>"),
        lines.len(),
        sink.count
    );

    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut output = lines.join(newline);
    if !lines.is_empty() {
        output.push_str(newline);
    }
    output
}
