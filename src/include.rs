//! Resolution of `include-tagged::` directives.
//!
//! The preprocessor only recognises the directive; pulling in the tagged
//! region is up to an [`IncludeResolver`].

use crate::diag::{self, Diagnostic, DiagnosticSink};
use crate::reader::{Line, Position, Reader};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Prefix marking a target as a tagged include.
pub const TAGGED_INCLUDE_SCHEME: &str = "include-tagged:";

/// Deepest include nesting followed before giving up, as in Asciidoctor.
pub const MAX_INCLUDE_DEPTH: usize = 64;

lazy_static! {
    pub static ref TAGGED_INCLUDE_RE: Regex =
        Regex::new(r"^include-tagged::(\S[^\[]*)\[([^\]]*)\]\s*$").unwrap();
    static ref TAG_MARKER_RE: Regex =
        Regex::new(r"(?:^|\W)(tag|end)::([\w.-]+)(?:\[\])?\s*$").unwrap();
}

/// Outcome of resolving a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The directive was handled; any content has been pushed to the reader.
    Included,
    /// The directive is malformed and has already been reported.
    Invalid,
}

/// Expands an include directive into the reader.
pub trait IncludeResolver {
    fn resolve(
        &mut self,
        reader: &mut Reader,
        target: &str,
        attrlist: &str,
        origin: &Line,
        sink: &mut dyn DiagnosticSink,
    ) -> Resolution;
}

/// Resolver that reads the tagged region of a file on disk.
///
/// A region runs from a line ending in `tag::<name>` to the line ending in
/// `end::<name>`, exclusive. The markers are usually in comments, as in
/// `// tag::example`.
#[derive(Debug)]
pub struct TaggedRegionResolver {
    /// Directory relative targets resolve against. Without one, targets are
    /// relative to the including file.
    base_dir: Option<PathBuf>,
    /// Strip the common indentation of the region.
    dedent: bool,
    max_depth: usize,
}

impl TaggedRegionResolver {
    pub fn new(base_dir: Option<PathBuf>, dedent: bool) -> Self {
        Self {
            base_dir,
            dedent,
            max_depth: MAX_INCLUDE_DEPTH,
        }
    }

    /// Refuse directives already nested `max_depth` includes deep.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn resolve_path(&self, target: &str, origin: &Position) -> PathBuf {
        let path = Path::new(target);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        if let Some(base) = &self.base_dir {
            return base.join(path);
        }
        match origin.file.as_deref().and_then(|f| Path::new(f).parent()) {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }
}

impl IncludeResolver for TaggedRegionResolver {
    fn resolve(
        &mut self,
        reader: &mut Reader,
        target: &str,
        attrlist: &str,
        origin: &Line,
        sink: &mut dyn DiagnosticSink,
    ) -> Resolution {
        let depth = origin.depth;
        let origin = &origin.position;
        if depth >= self.max_depth {
            sink.report(Diagnostic::warning(
                diag::INCLUDE_DEPTH,
                format!(
                    "'{target}' is nested more than {} includes deep",
                    self.max_depth
                ),
                origin.clone(),
            ));
            return Resolution::Invalid;
        }
        let tag = attrlist.trim();
        let path = match target.strip_prefix(TAGGED_INCLUDE_SCHEME) {
            Some(path) if !path.trim().is_empty() => path.trim(),
            _ => {
                sink.report(Diagnostic::warning(
                    diag::INVALID_INCLUDE,
                    format!("'{target}' is not a tagged include target"),
                    origin.clone(),
                ));
                return Resolution::Invalid;
            }
        };
        if tag.is_empty() || tag.contains(|c: char| c.is_whitespace() || c == ',') {
            sink.report(Diagnostic::warning(
                diag::INVALID_INCLUDE,
                format!("include-tagged::{path} needs exactly one tag, got [{attrlist}]"),
                origin.clone(),
            ));
            return Resolution::Invalid;
        }

        let file = self.resolve_path(path, origin);
        let contents = match std::fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(e) => {
                sink.report(Diagnostic::warning(
                    diag::INCLUDE_MISSING,
                    format!("failed to read '{}': {}", file.display(), e),
                    origin.clone(),
                ));
                reader.push_lines(vec![Line::included(
                    format!("Unresolved directive in {origin} - include-tagged::{path}[{attrlist}]"),
                    origin.clone(),
                    depth + 1,
                )]);
                return Resolution::Included;
            }
        };

        let file_name = file.display().to_string();
        let region = match tagged_region(&contents, tag) {
            Some(region) => region,
            None => {
                sink.report(Diagnostic::warning(
                    diag::TAG_MISSING,
                    format!("tag '{tag}' not found in '{file_name}'"),
                    origin.clone(),
                ));
                return Resolution::Included;
            }
        };
        if !region.terminated {
            sink.report(Diagnostic::warning(
                diag::TAG_UNTERMINATED,
                format!("no end::{tag} in '{file_name}', including to end of file"),
                origin.clone(),
            ));
        }

        let indent = if self.dedent {
            common_indent(&region.lines)
        } else {
            0
        };
        debug!(
            "include {} lines of '{file_name}' tag '{tag}' at {origin}",
            region.lines.len()
        );
        let lines = region
            .lines
            .iter()
            .map(|(number, text)| {
                let text = if text.trim().is_empty() {
                    ""
                } else {
                    &text[indent..]
                };
                Line::included(
                    text,
                    Position::new(Some(file_name.as_str()), *number),
                    depth + 1,
                )
            })
            .collect();
        reader.push_lines(lines);
        Resolution::Included
    }
}

/// Lines of a tagged region, with their 1-indexed line numbers.
#[derive(Debug, PartialEq, Eq)]
pub struct Region<'a> {
    pub lines: Vec<(usize, &'a str)>,
    /// Whether the closing `end::` marker was found.
    pub terminated: bool,
}

/// Extract the region tagged `tag` from `contents`. Marker lines for other
/// tags inside the region are dropped.
pub fn tagged_region<'a>(contents: &'a str, tag: &str) -> Option<Region<'a>> {
    let mut lines = Vec::new();
    let mut inside = false;
    for (idx, text) in contents.lines().enumerate() {
        if let Some(caps) = TAG_MARKER_RE.captures(text) {
            let is_ours = &caps[2] == tag;
            match &caps[1] {
                "tag" if is_ours && !inside => inside = true,
                "end" if is_ours && inside => {
                    return Some(Region {
                        lines,
                        terminated: true,
                    })
                }
                _ => {}
            }
            continue;
        }
        if inside {
            lines.push((idx + 1, text));
        }
    }
    if inside {
        Some(Region {
            lines,
            terminated: false,
        })
    } else {
        None
    }
}

/// Byte length of the whitespace prefix shared by all non-blank lines.
fn common_indent(lines: &[(usize, &str)]) -> usize {
    lines
        .iter()
        .map(|(_, text)| *text)
        .filter(|text| !text.trim().is_empty())
        .map(|text| text.len() - text.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0)
}
