//! In-memory line source feeding the preprocessor.

use std::collections::VecDeque;

/// Location of a line in its source document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// File the line came from, if known.
    pub file: Option<String>,
    /// 1-indexed line number.
    pub line: usize,
}

impl Position {
    pub fn new(file: Option<&str>, line: usize) -> Self {
        Self {
            file: file.map(|f| f.to_string()),
            line,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file, self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// A single line of text plus where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub position: Position,
    /// Number of includes this line is nested in; 0 for the document itself.
    pub depth: usize,
}

impl Line {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
            depth: 0,
        }
    }

    /// A line pulled in by an include of the given nesting depth.
    pub fn included(text: impl Into<String>, position: Position, depth: usize) -> Self {
        Self {
            depth,
            ..Self::new(text, position)
        }
    }
}

/// Queue of pending lines.
///
/// The first `look_ahead` lines of the queue have already been through the
/// preprocessor and are handed out verbatim by [`Reader::take_processed`].
#[derive(Debug, Default)]
pub struct Reader {
    lines: VecDeque<Line>,
    look_ahead: usize,
}

impl Reader {
    /// Split `text` into lines, numbering them from 1.
    pub fn from_text(text: &str, file: Option<&str>) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(idx, l)| Line::new(l, Position::new(file, idx + 1)))
            .collect();
        Self {
            lines,
            look_ahead: 0,
        }
    }

    /// Pop the next line that still needs preprocessing.
    pub fn next_line(&mut self) -> Option<Line> {
        if self.look_ahead > 0 {
            return None;
        }
        self.lines.pop_front()
    }

    /// Pop the next line that was already processed, if there is one.
    pub fn take_processed(&mut self) -> Option<Line> {
        if self.look_ahead == 0 {
            return None;
        }
        self.look_ahead -= 1;
        self.lines.pop_front()
    }

    /// Pending line `n` positions ahead (0 is the next line).
    pub fn peek(&self, n: usize) -> Option<&Line> {
        self.lines.get(n)
    }

    /// Put a line back at the head of the queue.
    pub fn unshift(&mut self, line: Line) {
        self.lines.push_front(line);
    }

    /// Insert `lines` at the head of the queue, ahead of everything else.
    /// They are preprocessed like any other line.
    pub fn push_lines(&mut self, lines: Vec<Line>) {
        // Already-processed lines must stay at the head.
        let at = self.look_ahead;
        for (offset, line) in lines.into_iter().enumerate() {
            self.lines.insert(at + offset, line);
        }
    }

    /// Mark the next `n` pending lines as already processed.
    pub fn advance_look_ahead(&mut self, n: usize) {
        self.look_ahead = (self.look_ahead + n).min(self.lines.len());
    }

    #[cfg(test)]
    pub fn look_ahead(&self) -> usize {
        self.look_ahead
    }
}
