//! Warning records produced while rewriting.

use crate::reader::Position;
use log::warn;

/// Fence close did not match its open.
pub const DELIMITER_MISMATCH: &str = "delimiter-mismatch";
/// Document ended inside an attribute-only block.
pub const UNTERMINATED_BLOCK: &str = "unterminated-block";
/// Document ended inside a fence.
pub const UNTERMINATED_FENCE: &str = "unterminated-fence";
/// Tagged include directive that cannot be interpreted.
pub const INVALID_INCLUDE: &str = "invalid-include";
pub const INCLUDE_MISSING: &str = "include-missing";
/// Includes nested past the resolver's limit.
pub const INCLUDE_DEPTH: &str = "include-depth";
pub const TAG_MISSING: &str = "tag-missing";
pub const TAG_UNTERMINATED: &str = "tag-unterminated";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal anomaly found in the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable identifier, one of the constants in this module.
    pub code: &'static str,
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn warning(code: &'static str, message: impl Into<String>, position: Position) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}: [{}] {}",
            self.severity, self.position, self.code, self.message
        )
    }
}

/// Destination for diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that forwards everything to the `log` crate.
#[derive(Debug, Default)]
pub struct LogSink {
    /// Number of diagnostics seen so far.
    pub count: usize,
}

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        warn!("{diagnostic}");
    }
}
