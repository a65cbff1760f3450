use std::{path::PathBuf, time::Duration};

use clap::Parser;
use eyre::Result;
use krug_driver::{
    DEFAULT_COMPILER, DEFAULT_SERVER, Driver, DriverOptions, RunOutcome, TerminalOutput,
    source_paths,
};

/// Extension trait for exiting on driver errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for krug_driver::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "krug")]
#[command(version)]
#[command(about = "Compile krug programs with a remote compiler service")]
pub(crate) struct Cli {
    /// Source files to compile; arguments not ending in .krug are ignored
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Address of the compiler service, e.g. 127.0.0.1:8001
    #[arg(long, env = "KRUG_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Generate C and compile it with the native compiler
    #[arg(long = "gen")]
    pub codegen: bool,

    /// Print the tokens of every file
    #[arg(long = "dumptokens")]
    pub dump_tokens: bool,

    /// Print the IR module before semantic analysis
    #[arg(long = "dumpir")]
    pub dump_ir: bool,

    /// Native C compiler for the generated source
    #[arg(long, env = "KRUG_CC", default_value = DEFAULT_COMPILER)]
    pub cc: String,

    /// Give up on a stage request after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Directory for the temporary generated source
    #[arg(long, default_value = ".")]
    pub artifact_dir: PathBuf,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let paths = source_paths(&self.files);
        if paths.is_empty() {
            tracing::warn!("no .krug source files given");
        }

        let mut driver = Driver::connect(self.options(), TerminalOutput::new()).unwrap_or_exit();
        let report = driver.run(&paths).unwrap_or_exit();

        match report.outcome {
            RunOutcome::Aborted { stage } => {
                tracing::info!(%stage, fatal = report.fatal, "compilation stopped");
            }
            RunOutcome::Checked { codegen_suppressed } => {
                tracing::info!(
                    diagnostics = report.diagnostics,
                    codegen_suppressed,
                    "analysis finished"
                );
            }
            RunOutcome::Compiled { status } => {
                tracing::info!(%status, "native compiler finished");
            }
        }

        Ok(())
    }

    fn options(&self) -> DriverOptions {
        DriverOptions {
            server: self.server.clone(),
            codegen: self.codegen,
            dump_tokens: self.dump_tokens,
            dump_ir: self.dump_ir,
            compiler: self.cc.clone(),
            artifact_dir: self.artifact_dir.clone(),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}
