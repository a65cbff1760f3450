//! Generated-source lifecycle: temp file, native compiler, cleanup.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use krug_api::GeneratedArtifact;

use crate::error::{Error, Result};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Bits drawn per candidate letter index.
const LETTER_BITS: u32 = 6;
const LETTER_MASK: u64 = (1 << LETTER_BITS) - 1;

/// Length of the random part of a generated file name.
pub const SUFFIX_LEN: usize = 16;

/// Random ASCII letters.
///
/// Six bits are drawn per candidate and indices past the alphabet are
/// rejected, so every letter is equally likely.
pub fn random_suffix(rng: &mut fastrand::Rng, len: usize) -> String {
    let mut suffix = String::with_capacity(len);
    while suffix.len() < len {
        let idx = (rng.u64(..) & LETTER_MASK) as usize;
        if let Some(&letter) = LETTERS.get(idx) {
            suffix.push(letter as char);
        }
    }
    suffix
}

/// `krug_main_<16 letters>.c`
pub fn artifact_name(rng: &mut fastrand::Rng) -> String {
    format!("krug_main_{}.c", random_suffix(rng, SUFFIX_LEN))
}

/// A generated source file that is deleted when the compile is over.
///
/// Call [`TempSource::remove`] to delete it and observe failures. If the guard
/// is dropped first (early return, panic) the file is still removed.
#[derive(Debug)]
pub struct TempSource {
    path: PathBuf,
    removed: bool,
}

impl TempSource {
    /// Create `path`, which must not exist yet, and fill it with `contents`.
    pub fn create(path: PathBuf, contents: &[u8]) -> Result<Self> {
        let file = open_new(&path).map_err(|source| {
            Box::new(Error::WriteArtifact {
                path: path.clone(),
                source,
            })
        })?;
        let guard = Self {
            path,
            removed: false,
        };

        // The handle is closed by the time the guard can delete the file.
        fill(file, contents).map_err(|source| {
            Box::new(Error::WriteArtifact {
                path: guard.path.clone(),
                source,
            })
        })?;

        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file.
    pub fn remove(mut self) -> Result<()> {
        self.removed = true;
        fs::remove_file(&self.path).map_err(|source| {
            Box::new(Error::RemoveArtifact {
                path: self.path.clone(),
                source,
            })
        })
    }
}

impl Drop for TempSource {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            tracing::error!(path = %self.path.display(), %err, "failed to remove generated source");
        }
    }
}

/// Write everything and close `dest`.
fn fill(mut dest: impl Write, contents: &[u8]) -> io::Result<()> {
    dest.write_all(contents)?;
    dest.flush()
}

#[cfg(unix)]
fn open_new(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o644)
        .open(path)
}

#[cfg(not(unix))]
fn open_new(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Hands generated source to the native C compiler.
pub struct Finalizer {
    compiler: String,
    dir: PathBuf,
    rng: fastrand::Rng,
}

impl Finalizer {
    /// Write artifacts into `dir` and compile them with `compiler`.
    pub fn new(compiler: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
            dir: dir.into(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Use a specific random source for file names.
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Write `artifact` to a fresh file, compile it, and delete the file.
    ///
    /// The compiler's stdout and stderr are forwarded to ours. The file is
    /// removed whether the compiler succeeds, fails, or cannot be started.
    ///
    /// # Errors
    ///
    /// Failing to write or remove the file, to start the compiler, or a
    /// non-success exit status from it.
    pub fn finalize(&mut self, artifact: &GeneratedArtifact) -> Result<ExitStatus> {
        let source = self.create_source(artifact.as_bytes())?;
        tracing::debug!(path = %source.path().display(), compiler = %self.compiler, "compiling generated source");

        let status = self.compile(source.path());
        source.remove()?;

        let status = status?;
        if !status.success() {
            return Err(Box::new(Error::CompilerFailed {
                compiler: self.compiler.clone(),
                status,
            }));
        }
        Ok(status)
    }

    fn create_source(&mut self, contents: &[u8]) -> Result<TempSource> {
        loop {
            let path = self.dir.join(artifact_name(&mut self.rng));
            match TempSource::create(path, contents) {
                Err(err) if is_name_taken(&err) => {
                    tracing::debug!("generated file name already taken, drawing another");
                }
                other => return other,
            }
        }
    }

    fn compile(&self, path: &Path) -> Result<ExitStatus> {
        Command::new(&self.compiler)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| {
                Box::new(Error::SpawnCompiler {
                    compiler: self.compiler.clone(),
                    source,
                })
            })
    }
}

fn is_name_taken(err: &Error) -> bool {
    matches!(err, Error::WriteArtifact { source, .. } if source.kind() == io::ErrorKind::AlreadyExists)
}
