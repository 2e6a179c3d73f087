//! Result and error types shared by the engine, the VM and the freezer.

/// Result of matching one symbol or term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    Failed,
    /// A throw fired; unwinds to the top-level parse.
    Aborted,
}

impl Outcome {
    pub fn matched(self) -> bool {
        self == Outcome::Matched
    }
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok {
            Outcome::Matched
        } else {
            Outcome::Failed
        }
    }
}

/// A rejected line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// `expected` is rendered as `<name>` for rules and leaves, `"text"` for
    /// terminals.
    #[error("{expected} expected at offset {position}")]
    NoMatch { position: usize, expected: String },

    #[error("parse aborted at offset {position}")]
    Aborted { position: usize },
}

impl ParseFailure {
    pub fn position(&self) -> usize {
        match self {
            ParseFailure::NoMatch { position, .. } | ParseFailure::Aborted { position } => {
                *position
            }
        }
    }

    /// The caret line printed under the rejected input.
    pub fn caret(&self) -> String {
        let pad = " ".repeat(self.position());
        match self {
            ParseFailure::NoMatch { expected, .. } => format!("{}^- {} expected", pad, expected),
            ParseFailure::Aborted { .. } => format!("{}^- parse aborted", pad),
        }
    }
}

/// Runtime failure of the semantic VM.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },

    #[error("stack underflow")]
    StackUnderflow,

    #[error("expected a name, found {found}")]
    ExpectedName { found: &'static str },
}

/// Malformed frozen grammar text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThawError {
    #[error("line {line}: malformed declaration `{text}`")]
    Malformed { line: usize, text: String },

    #[error("line {line}: unknown reference `{name}`")]
    UnknownReference { line: usize, name: String },

    #[error("missing definition of `{name}`")]
    MissingDefinition { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_lines() {
        let failure = ParseFailure::NoMatch { position: 3, expected: "<integer>".to_string() };
        assert_eq!(failure.caret(), "   ^- <integer> expected");
        assert_eq!(failure.to_string(), "<integer> expected at offset 3");

        let aborted = ParseFailure::Aborted { position: 0 };
        assert_eq!(aborted.caret(), "^- parse aborted");
    }

    #[test]
    fn test_outcome_from_bool() {
        assert_eq!(Outcome::from(true), Outcome::Matched);
        assert!(!Outcome::from(false).matched());
    }
}
