//! Source compilation units.

use std::{io, path::Path};

use serde::{Deserialize, Serialize};

/// Extension a command-line argument must carry to be compiled.
pub const SOURCE_EXTENSION: &str = ".krug";

/// A source file's text plus the path it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompilationUnit {
    pub name: String,
    pub code: String,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Read a unit from disk, naming it after its path.
    pub fn read(path: &Path) -> io::Result<Self> {
        let code = std::fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), code))
    }

    /// Slice the source between two character offsets, `[start, end)`.
    ///
    /// `end` is clamped to the end of the text. Returns `None` when `start`
    /// lies past the end or after `end`.
    pub fn excerpt(&self, start: usize, end: usize) -> Option<&str> {
        if start > end {
            return None;
        }
        let from = self.byte_offset(start)?;
        let to = self.byte_offset(end).unwrap_or(self.code.len());
        Some(&self.code[from..to])
    }

    /// Byte index of the `chars`-th character; the text length is a valid end.
    fn byte_offset(&self, chars: usize) -> Option<usize> {
        self.code
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(self.code.len()))
            .nth(chars)
    }
}
