//! Pipeline orchestrator.

use std::{
    ops::ControlFlow,
    path::{Path, PathBuf},
    time::Instant,
};

use krug_api::{GeneratedArtifact, Module, ParseTree, TokenStream};
use serde::Serialize;

use super::{DriverOptions, RunOutcome, RunReport, SemaPass, Stage};
use crate::{
    artifact::Finalizer,
    client::{HttpTransport, StageClient, StageResponse, Transport},
    error::Result,
    output::Output,
    reporter::{Origin, Reporter},
    sources::SourceSet,
};

/// Drives source files through the remote compiler stages.
///
/// The driver owns the run's [`Reporter`] and the loaded [`SourceSet`]; the
/// service owns everything else, including consistency between the module
/// that is resolved and the one that is generated.
pub struct Driver<T, O> {
    client: StageClient<T>,
    output: O,
    options: DriverOptions,
    finalizer: Finalizer,
    sources: SourceSet,
    reporter: Reporter,
    /// The file the per-file stages are working on.
    current: Option<PathBuf>,
}

impl<O: Output> Driver<HttpTransport, O> {
    /// Create a driver talking HTTP to `options.server`.
    pub fn connect(options: DriverOptions, output: O) -> Result<Self> {
        let transport = HttpTransport::new(options.timeout)?;
        Ok(Self::new(transport, options, output))
    }
}

impl<T: Transport, O: Output> Driver<T, O> {
    pub fn new(transport: T, options: DriverOptions, output: O) -> Self {
        let finalizer = Finalizer::new(options.compiler.clone(), options.artifact_dir.clone());
        Self {
            client: StageClient::new(transport, options.server.clone()),
            output,
            options,
            finalizer,
            sources: SourceSet::new(),
            reporter: Reporter::new(),
            current: None,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Compile `paths` as one program.
    ///
    /// A fatal diagnostic is not an error: the run stops and the outcome says
    /// which stage reported it.
    ///
    /// # Errors
    ///
    /// Unreadable sources, transport and decode failures, and anything that
    /// goes wrong while compiling the generated source.
    pub fn run(&mut self, paths: &[PathBuf]) -> Result<RunReport> {
        let start = Instant::now();
        let outcome = self.drive(paths)?;
        let report = RunReport {
            outcome,
            diagnostics: self.reporter.len(),
            fatal: self.reporter.fatal_count(),
            elapsed: start.elapsed(),
        };

        if !report.is_aborted() {
            self.output.total_time(report.elapsed);
        }
        Ok(report)
    }

    fn drive(&mut self, paths: &[PathBuf]) -> Result<RunOutcome> {
        let mut trees = Vec::with_capacity(paths.len());
        for path in paths {
            match self.front_end(path)? {
                ControlFlow::Continue(tree) => trees.push(tree),
                ControlFlow::Break(stage) => return Ok(RunOutcome::Aborted { stage }),
            }
        }

        let Some(built) = self.request(Stage::BuildIr, &trees)? else {
            return Ok(RunOutcome::Aborted {
                stage: Stage::BuildIr,
            });
        };
        let module: Module = built.decode()?;
        if self.options.dump_ir {
            self.output.module(&module.to_string());
        }

        // Resolution runs on the scoped module, but code generation below is
        // handed the module from /ir/build.
        let Some(scoped) = self.request(Stage::BuildScope, &module)? else {
            return Ok(RunOutcome::Aborted {
                stage: Stage::BuildScope,
            });
        };
        let scoped: Module = scoped.decode()?;

        for pass in SemaPass::ALL {
            let stage = Stage::Resolve(pass);
            if self.request(stage, &scoped)?.is_none() {
                return Ok(RunOutcome::Aborted { stage });
            }
        }

        if !self.options.codegen {
            return Ok(RunOutcome::Checked {
                codegen_suppressed: false,
            });
        }
        if !self.reporter.is_clean() {
            tracing::info!(
                diagnostics = self.reporter.len(),
                "skipping code generation, diagnostics were reported"
            );
            return Ok(RunOutcome::Checked {
                codegen_suppressed: true,
            });
        }

        let Some(generated) = self.request(Stage::Generate, &module)? else {
            return Ok(RunOutcome::Aborted {
                stage: Stage::Generate,
            });
        };
        let artifact = GeneratedArtifact::from(generated.payload);
        if artifact.is_empty() {
            tracing::warn!("code generation returned an empty source");
        }
        self.output.generated_source(&artifact.source());

        let status = self.finalizer.finalize(&artifact)?;
        Ok(RunOutcome::Compiled { status })
    }

    /// Lex and parse one file, breaking with the stage that reported a fatal diagnostic.
    fn front_end(&mut self, path: &Path) -> Result<ControlFlow<Stage, ParseTree>> {
        let unit = self.sources.load(path)?.clone();
        tracing::debug!(path = %path.display(), chars = unit.code.chars().count(), "loaded source");
        self.current = Some(path.to_path_buf());

        let Some(lexed) = self.request(Stage::Lex, &unit)? else {
            return Ok(ControlFlow::Break(Stage::Lex));
        };
        let stream: TokenStream = lexed.decode()?;
        tracing::debug!(path = %path.display(), tokens = stream.len(), "lexed");
        if self.options.dump_tokens {
            for token in &stream.tokens {
                self.output.token(&token.to_string());
            }
        }

        let Some(parsed) = self.request(Stage::Parse, &stream)? else {
            return Ok(ControlFlow::Break(Stage::Parse));
        };
        Ok(ControlFlow::Continue(parsed.decode()?))
    }

    /// Call one stage and report its diagnostics.
    ///
    /// Per-file stages point their excerpts at the current file; the rest
    /// search every loaded unit. Returns `None` when a reported diagnostic is
    /// fatal.
    fn request<V>(&mut self, stage: Stage, input: &V) -> Result<Option<StageResponse>>
    where
        V: Serialize + ?Sized,
    {
        let mut response = self.client.call(&stage.route(), input)?;
        self.output.stage_timing(&response.url, response.elapsed);

        let origin = match &self.current {
            Some(path) if stage.is_per_file() => Origin::Unit(path.as_path()),
            _ => Origin::Program,
        };
        let diagnostics = std::mem::take(&mut response.diagnostics);
        let fatal = self
            .reporter
            .report(diagnostics, &self.sources, origin, &mut self.output);

        Ok((!fatal).then_some(response))
    }
}
