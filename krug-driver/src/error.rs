use std::{path::PathBuf, process::ExitStatus};

use miette::Diagnostic;
use thiserror::Error;

/// Result type for driver operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Unrecoverable driver failures.
///
/// Stage diagnostics are not errors: they travel as
/// [`CompilerError`](krug_api::CompilerError) values and are handled by the
/// [`Reporter`](crate::Reporter). Anything in here ends the run.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(krug::read_source))]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode request for {route}")]
    #[diagnostic(code(krug::encode))]
    Encode {
        route: String,
        #[source]
        source: rmp_serde::encode::Error,
    },

    #[error("failed to decode payload from {route}")]
    #[diagnostic(
        code(krug::decode),
        help("the compiler service and this driver may disagree on the payload format")
    )]
    Decode {
        route: String,
        #[source]
        source: rmp_serde::decode::Error,
    },

    #[error("request to {url} failed")]
    #[diagnostic(
        code(krug::transport),
        help("is the compiler service running? pass its address with --server")
    )]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    #[diagnostic(code(krug::status))]
    Status { url: String, status: u16 },

    #[error("malformed response envelope from {url}")]
    #[diagnostic(code(krug::envelope))]
    Envelope {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write generated source to '{path}'")]
    #[diagnostic(code(krug::write_artifact))]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run C compiler '{compiler}'")]
    #[diagnostic(
        code(krug::spawn_compiler),
        help("install '{compiler}' or choose another compiler with --cc")
    )]
    SpawnCompiler {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    #[error("C compiler '{compiler}' exited with {status}")]
    #[diagnostic(code(krug::compiler_failed))]
    CompilerFailed { compiler: String, status: ExitStatus },

    #[error("failed to remove generated source '{path}'")]
    #[diagnostic(code(krug::remove_artifact))]
    RemoveArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
