//! Outer JSON framing for stage requests and responses.

use serde::{Deserialize, Serialize};

use crate::{
    CompilerError,
    serde_helpers::{base64_bytes, null_as_default},
};

/// Body of every stage request: `{"Data": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestEnvelope {
    /// Inner binary payload.
    #[serde(default, with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl RequestEnvelope {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// Body of every stage response: `{"Data": "<base64>", "Errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseEnvelope {
    /// Inner binary payload, left for the caller to decode.
    #[serde(default, with = "base64_bytes")]
    pub data: Vec<u8>,
    /// Diagnostics produced by the stage.
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<CompilerError>,
}

impl ResponseEnvelope {
    pub fn new(data: Vec<u8>, errors: Vec<CompilerError>) -> Self {
        Self { data, errors }
    }

    /// Split into the raw payload and the diagnostics.
    pub fn into_parts(self) -> (Vec<u8>, Vec<CompilerError>) {
        (self.data, self.errors)
    }
}
