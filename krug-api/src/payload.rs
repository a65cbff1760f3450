//! Stage payloads.
//!
//! The service owns the shape of tokens, parse trees and IR modules. The driver
//! only carries them from one stage to the next, so they are held as
//! self-describing values and round-trip without loss.

use std::{borrow::Cow, fmt};

use rmpv::Value;
use serde::{Deserialize, Serialize};

use crate::serde_helpers::null_as_default;

/// One lexical token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub Value);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tokens produced by `/front/lex` for one compilation unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenStream {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tokens: Vec<Token>,
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Parse tree produced by `/front/parse` for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParseTree(pub Value);

/// Whole-program IR returned by `/ir/build` and refined by `/mid/build_scope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Module(pub Value);

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target-language source emitted by `/back/gen`.
///
/// The stage returns the C source directly as its payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedArtifact {
    bytes: Vec<u8>,
}

impl GeneratedArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The source as text, replacing invalid UTF-8.
    pub fn source(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for GeneratedArtifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: &str, value: &str) -> Token {
        Token(Value::Map(vec![
            (Value::from("Kind"), Value::from(kind)),
            (Value::from("Value"), Value::from(value)),
        ]))
    }

    #[test]
    fn test_token_stream_msgpack_round_trip() {
        let stream = TokenStream {
            tokens: vec![token("identifier", "main"), token("symbol", "{")],
        };

        let bytes = rmp_serde::to_vec_named(&stream).unwrap();
        let decoded: TokenStream = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded, stream);
    }

    #[test]
    fn test_empty_token_stream_round_trip() {
        let bytes = rmp_serde::to_vec_named(&TokenStream::default()).unwrap();
        let decoded: TokenStream = rmp_serde::from_slice(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_nested_module_round_trip() {
        let mut node = Value::Array(Vec::new());
        for depth in 0..64 {
            node = Value::Map(vec![
                (Value::from("Depth"), Value::from(depth)),
                (Value::from("Children"), Value::Array(vec![node])),
                (Value::from("Blob"), Value::Binary(vec![depth as u8; 3])),
                (Value::from("Offset"), Value::from(-1i64 - depth)),
            ]);
        }
        let module = Module(node);

        let bytes = rmp_serde::to_vec_named(&module).unwrap();
        let decoded: Module = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded, module);
    }

    #[test]
    fn test_parse_tree_sequence_preserves_order() {
        let trees = vec![
            ParseTree(Value::from("a.krug")),
            ParseTree(Value::from("b.krug")),
        ];

        let bytes = rmp_serde::to_vec_named(&trees).unwrap();
        let decoded: Vec<ParseTree> = rmp_serde::from_slice(&bytes).unwrap();

        assert_eq!(decoded, trees);
    }

    #[test]
    fn test_generated_artifact_source() {
        let artifact = GeneratedArtifact::from(b"int main() { return 0; }".to_vec());
        assert_eq!(artifact.source(), "int main() { return 0; }");
        assert!(!artifact.is_empty());
    }
}
