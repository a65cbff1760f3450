//! Driver configuration.

use std::{path::PathBuf, time::Duration};

/// Compiler service address used when none is given.
pub const DEFAULT_SERVER: &str = "127.0.0.1:8001";

/// Native C compiler used when none is given.
pub const DEFAULT_COMPILER: &str = "clang";

/// What a [`Driver`](super::Driver) run does and where it talks to.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// `host:port` of the compiler service.
    pub server: String,
    /// Generate C and compile it when the run is clean.
    pub codegen: bool,
    /// Print every token returned by the lexer.
    pub dump_tokens: bool,
    /// Print the IR module returned by `/ir/build`.
    pub dump_ir: bool,
    /// Native C compiler invoked on the generated source.
    pub compiler: String,
    /// Directory the generated source is written to.
    pub artifact_dir: PathBuf,
    /// Per-request timeout. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            codegen: false,
            dump_tokens: false,
            dump_ir: false,
            compiler: DEFAULT_COMPILER.to_string(),
            artifact_dir: PathBuf::from("."),
            timeout: None,
        }
    }
}
