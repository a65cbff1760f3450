//! Diagnostics reported by compiler stages.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::null_as_default;

/// A diagnostic returned by a remote compiler stage.
///
/// The driver never builds these itself; they only arrive inside a
/// [`ResponseEnvelope`](crate::ResponseEnvelope).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompilerError {
    /// Human readable message.
    pub title: String,
    /// Whether this diagnostic halts the pipeline.
    #[serde(default)]
    pub fatal: bool,
    /// Character offsets into the source, paired as `(start, end)` spans.
    #[serde(default, deserialize_with = "null_as_default")]
    pub code_context: Vec<i64>,
}

impl CompilerError {
    /// Create a non-fatal diagnostic without source context.
    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fatal: false,
            code_context: Vec::new(),
        }
    }

    /// Create a fatal diagnostic without source context.
    pub fn fatal(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fatal: true,
            code_context: Vec::new(),
        }
    }

    /// Attach a highlighted `[start, end)` span.
    pub fn span(mut self, start: i64, end: i64) -> Self {
        self.code_context.push(start);
        self.code_context.push(end);
        self
    }

    /// Iterate the highlighted spans.
    ///
    /// Elements are paired `(0, 1)`, `(2, 3)`, ... and a dangling odd element is
    /// skipped rather than read past.
    pub fn spans(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.code_context
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    /// Whether the code context breaks the even-length invariant.
    pub fn has_dangling_offset(&self) -> bool {
        self.code_context.len() % 2 != 0
    }
}
