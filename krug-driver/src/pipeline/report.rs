//! What a pipeline run ended with.

use std::{process::ExitStatus, time::Duration};

use super::Stage;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A fatal diagnostic stopped the pipeline after `stage`.
    Aborted { stage: Stage },
    /// Analysis finished without generating code.
    ///
    /// `codegen_suppressed` is set when code generation was requested but an
    /// earlier diagnostic ruled it out.
    Checked { codegen_suppressed: bool },
    /// Code was generated and the native compiler accepted it.
    Compiled { status: ExitStatus },
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Diagnostics reported across every stage.
    pub diagnostics: usize,
    /// How many of those were fatal.
    pub fatal: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::Aborted { .. })
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.outcome, RunOutcome::Compiled { .. })
    }
}
