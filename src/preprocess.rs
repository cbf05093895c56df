//! Line-rewriting state machine.
//!
//! Lines are dispatched in priority order: the body of an attribute-only
//! block, the start of such a block, a tagged include, and finally the
//! pattern rewrites (which include fence reconciliation).

use crate::diag::{self, Diagnostic, DiagnosticSink};
use crate::include::{IncludeResolver, Resolution, TAGGED_INCLUDE_RE, TAGGED_INCLUDE_SCHEME};
use crate::reader::{Line, Position, Reader};
use crate::rewrite;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

/// Open block delimiter.
pub const BLOCK_DELIMITER: &str = "--";

lazy_static! {
    static ref ATTRIBUTE_ENTRY_RE: Regex = Regex::new(r"^:!?\w[^:]*:(?:[ \t]+.*)?$").unwrap();
}

/// What became of a processed line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Emit this text in place of the line. Blanked lines emit `""`.
    Emit(String),
    /// Nothing is emitted here; whatever replaces the line is now queued in
    /// the reader.
    Deferred,
}

/// Shape of an incoming line, in dispatch priority order.
enum LineKind {
    BlockDelimiter,
    TaggedInclude { target: String, attrlist: String },
    Ordinary,
}

impl LineKind {
    fn of(text: &str) -> Self {
        if text == BLOCK_DELIMITER {
            return Self::BlockDelimiter;
        }
        match TAGGED_INCLUDE_RE.captures(text) {
            Some(caps) => Self::TaggedInclude {
                target: caps[1].trim_end().to_string(),
                attrlist: caps[2].to_string(),
            },
            None => Self::Ordinary,
        }
    }
}

/// Per-document rewriting state. Use a fresh instance for every document.
#[derive(Debug, Default)]
pub struct Preprocessor {
    /// Start of the attribute-only block being absorbed, if any.
    attribute_block: Option<Position>,
    /// Opening line of the current listing fence, if any.
    open_fence: Option<Line>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_attribute_only_block(&self) -> bool {
        self.attribute_block.is_some()
    }

    /// Preprocess the whole of `reader`, returning the output lines.
    pub fn run(
        &mut self,
        reader: &mut Reader,
        resolver: &mut dyn IncludeResolver,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<String> {
        let mut output = Vec::new();
        loop {
            if let Some(line) = reader.take_processed() {
                output.push(line.text);
                continue;
            }
            let line = match reader.next_line() {
                Some(line) => line,
                None => break,
            };
            if let Step::Emit(text) = self.process_line(line, reader, resolver, sink) {
                output.push(text);
            }
        }
        self.finish(sink);
        output
    }

    /// Process a single line taken from `reader`.
    pub fn process_line(
        &mut self,
        line: Line,
        reader: &mut Reader,
        resolver: &mut dyn IncludeResolver,
        sink: &mut dyn DiagnosticSink,
    ) -> Step {
        if self.in_attribute_only_block() {
            if line.text == BLOCK_DELIMITER {
                debug!("attribute-only block closes at {}", line.position);
                self.attribute_block = None;
                return Step::Emit(String::new());
            }
            return Step::Emit(line.text);
        }

        match LineKind::of(&line.text) {
            LineKind::BlockDelimiter if attribute_only_block_ahead(reader) => {
                debug!("attribute-only block opens at {}", line.position);
                self.attribute_block = Some(line.position);
                Step::Emit(String::new())
            }
            LineKind::TaggedInclude { target, attrlist } => {
                let target = format!("{TAGGED_INCLUDE_SCHEME}{target}");
                match resolver.resolve(reader, &target, &attrlist, &line, sink) {
                    Resolution::Included => Step::Deferred,
                    Resolution::Invalid => {
                        // Hand the line back untouched, already processed.
                        reader.unshift(line);
                        reader.advance_look_ahead(1);
                        Step::Deferred
                    }
                }
            }
            LineKind::BlockDelimiter | LineKind::Ordinary => Step::Emit(self.rewrite(line, sink)),
        }
    }

    /// Report anything left open at the end of the document, then reset.
    pub fn finish(&mut self, sink: &mut dyn DiagnosticSink) {
        if let Some(position) = self.attribute_block.take() {
            sink.report(Diagnostic::warning(
                diag::UNTERMINATED_BLOCK,
                "attribute-only block is never closed",
                position,
            ));
        }
        if let Some(open) = self.open_fence.take() {
            sink.report(Diagnostic::warning(
                diag::UNTERMINATED_FENCE,
                format!("listing fence '{}' is never closed", open.text),
                open.position,
            ));
        }
    }

    fn rewrite(&mut self, line: Line, sink: &mut dyn DiagnosticSink) -> String {
        let Line { mut text, position, .. } = line;
        if !rewrite::needs_rewrite(&text) {
            return text;
        }
        rewrite::apply(&mut text, rewrite::BEFORE_FENCE);
        self.reconcile_fence(&mut text, position, sink);
        rewrite::apply(&mut text, rewrite::AFTER_FENCE);
        text
    }

    fn reconcile_fence(&mut self, text: &mut String, position: Position, sink: &mut dyn DiagnosticSink) {
        if !rewrite::is_fence(text) {
            return;
        }
        match self.open_fence.take() {
            None => self.open_fence = Some(Line::new(text.clone(), position)),
            Some(open) => {
                if open.text != *text {
                    sink.report(Diagnostic::warning(
                        diag::DELIMITER_MISMATCH,
                        format!(
                            "listing fence '{}' opened at {} closed with '{}'",
                            open.text, open.position, text
                        ),
                        position,
                    ));
                    *text = open.text;
                }
            }
        }
    }
}

/// Whether the lines after a block delimiter are attribute entries up to a
/// closing delimiter.
fn attribute_only_block_ahead(reader: &Reader) -> bool {
    let mut n = 0;
    while let Some(next) = reader.peek(n) {
        if next.text == BLOCK_DELIMITER {
            return true;
        }
        if !ATTRIBUTE_ENTRY_RE.is_match(&next.text) {
            return false;
        }
        n += 1;
    }
    false
}
