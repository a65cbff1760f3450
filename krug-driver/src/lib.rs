//! Client-side driver for the krug compiler service.
//!
//! The compiler itself runs remotely, one HTTP route per stage. This crate
//! sequences those stages, reports the diagnostics they return, and hands the
//! generated C to a native compiler.
//!
//! # Modules
//!
//! - [`envelope`] - MessagePack payloads inside a JSON envelope
//! - [`client`] - One request to one stage ([`StageClient`], [`Transport`])
//! - [`reporter`] - Diagnostic rendering and the fatal check ([`Reporter`])
//! - [`pipeline`] - Stage sequencing ([`Driver`])
//! - [`artifact`] - Temp file, native compiler, cleanup ([`Finalizer`])
//! - [`output`] - Rendering seam ([`Output`], [`TerminalOutput`])
//! - [`sources`] - Loaded compilation units ([`SourceSet`])
//! - [`testing`] - Test utilities (feature-gated)

pub mod artifact;
pub mod client;
pub mod envelope;
mod error;
pub mod output;
pub mod pipeline;
pub mod reporter;
pub mod sources;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use artifact::Finalizer;
pub use client::{HttpTransport, StageClient, StageResponse, Transport};
pub use error::{Error, Result};
pub use krug_api as api;
pub use output::{Output, TerminalOutput};
pub use pipeline::{
    DEFAULT_COMPILER, DEFAULT_SERVER, Driver, DriverOptions, RunOutcome, RunReport, SemaPass,
    Stage,
};
pub use reporter::{Origin, Reporter};
pub use sources::{SourceSet, source_paths};
