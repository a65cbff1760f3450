//! Diagnostic reporting and the fatal/non-fatal decision.

use std::path::Path;

use krug_api::{CompilationUnit, CompilerError};

use crate::{output::Output, sources::SourceSet};

/// Which loaded units a batch of diagnostics can point into.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// Diagnostics from a per-file stage; spans resolve against that unit only.
    Unit(&'a Path),
    /// Diagnostics from a whole-program stage.
    ///
    /// The service does not say which file a span belongs to, so every loaded
    /// unit is searched. Only single-file runs get accurate excerpts here.
    Program,
}

impl<'a> Origin<'a> {
    fn units(self, sources: &'a SourceSet) -> Vec<&'a CompilationUnit> {
        match self {
            Origin::Unit(path) => sources.get(path).into_iter().collect(),
            Origin::Program => sources.units().collect(),
        }
    }
}

/// Accumulates every diagnostic seen during a run.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<CompilerError>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `diagnostics` and record them.
    ///
    /// Returns true if any of them is fatal, meaning the pipeline must stop.
    pub fn report(
        &mut self,
        diagnostics: Vec<CompilerError>,
        sources: &SourceSet,
        origin: Origin<'_>,
        out: &mut dyn Output,
    ) -> bool {
        let has_fatal = diagnostics.iter().any(|d| d.fatal);

        for diagnostic in &diagnostics {
            write_diagnostic(diagnostic, sources, origin, out);
        }

        self.diagnostics.extend(diagnostics);
        has_fatal
    }

    /// Whether nothing at all has been reported, fatal or not.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn fatal_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.fatal).count()
    }

    pub fn diagnostics(&self) -> &[CompilerError] {
        &self.diagnostics
    }
}

fn write_diagnostic(
    diagnostic: &CompilerError,
    sources: &SourceSet,
    origin: Origin<'_>,
    out: &mut dyn Output,
) {
    tracing::debug!(title = %diagnostic.title, fatal = diagnostic.fatal, "stage diagnostic");
    out.diagnostic(&diagnostic.title);

    if diagnostic.has_dangling_offset() {
        tracing::warn!(
            title = %diagnostic.title,
            len = diagnostic.code_context.len(),
            "code context has an odd number of offsets; ignoring the last one"
        );
    }

    let units = origin.units(sources);
    for (start, end) in diagnostic.spans() {
        for unit in &units {
            match excerpt(unit, start, end) {
                Some(text) => out.source_excerpt(text),
                None => tracing::warn!(unit = %unit.name, start, end, "span lies outside source"),
            }
        }
    }
}

fn excerpt(unit: &CompilationUnit, start: i64, end: i64) -> Option<&str> {
    let start = usize::try_from(start).ok()?;
    let end = usize::try_from(end).ok()?;
    unit.excerpt(start, end)
}
