//! Wire types for the krug compiler service.
//!
//! This crate provides the values exchanged between the `krug` driver and the
//! remote compiler service. Nothing here performs I/O beyond reading a source
//! file from disk; transport and encoding live in `krug-driver`.
//!
//! # Architecture
//!
//! ```text
//! *.krug → CompilationUnit → /front/lex → TokenStream → /front/parse → ParseTree
//!        → /ir/build → Module → /mid/* → /back/gen → GeneratedArtifact
//! ```
//!
//! Every request travels inside a [`RequestEnvelope`] and every response comes
//! back as a [`ResponseEnvelope`] carrying the stage payload plus any
//! [`CompilerError`] diagnostics.

mod diagnostic;
mod envelope;
mod payload;
pub mod serde_helpers;
mod unit;

pub use diagnostic::CompilerError;
pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use payload::{GeneratedArtifact, Module, ParseTree, Token, TokenStream};
pub use unit::{CompilationUnit, SOURCE_EXTENSION};
