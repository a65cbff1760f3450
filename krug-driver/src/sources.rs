//! Compilation units loaded during a run.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use krug_api::{CompilationUnit, SOURCE_EXTENSION};

use crate::error::{Error, Result};

/// Keep only the arguments that name source files, in argument order.
pub fn source_paths<I, S>(args: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter(|arg| arg.as_ref().ends_with(SOURCE_EXTENSION))
        .map(|arg| PathBuf::from(arg.as_ref()))
        .collect()
}

/// Every compilation unit read so far, keyed by path.
#[derive(Debug, Default)]
pub struct SourceSet {
    units: IndexMap<PathBuf, CompilationUnit>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` from disk and keep it.
    pub fn load(&mut self, path: &Path) -> Result<&CompilationUnit> {
        let unit = CompilationUnit::read(path).map_err(|source| {
            Box::new(Error::ReadSource {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Ok(self.insert(path, unit))
    }

    /// Keep an already-read unit, replacing any unit previously read from `path`.
    pub fn insert(&mut self, path: &Path, unit: CompilationUnit) -> &CompilationUnit {
        let (index, _) = self.units.insert_full(path.to_path_buf(), unit);
        &self.units[index]
    }

    pub fn get(&self, path: &Path) -> Option<&CompilationUnit> {
        self.units.get(path)
    }

    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
