//! The compilation pipeline driver.
//!
//! [`Driver`] sequences the remote stages for a set of source files:
//!
//! - per file, in argument order: lex → parse
//! - whole program: build IR → build scope → resolve (type, symbol)
//! - optionally: generate C → compile with the native compiler
//!
//! Exactly one request is in flight at any time. A fatal diagnostic from any
//! stage ends the run before the next request is sent.
//!
//! # Example
//!
//! ```ignore
//! use krug_driver::{Driver, DriverOptions, TerminalOutput};
//!
//! let mut driver = Driver::connect(DriverOptions::default(), TerminalOutput::new())?;
//! let report = driver.run(&paths)?;
//! ```

mod driver;
mod options;
mod report;
mod stage;

pub use driver::Driver;
pub use options::{DEFAULT_COMPILER, DEFAULT_SERVER, DriverOptions};
pub use report::{RunOutcome, RunReport};
pub use stage::{SemaPass, Stage};
