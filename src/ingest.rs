//! Raw table ingestion: read a CSV file and clean it with its rule set.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::io::read_csv;
use crate::pipeline::{self, CleanedTable};
use crate::rules::RuleSet;

pub struct Ingestor<'r> {
    path: PathBuf,
    rules: &'r RuleSet,
}

impl<'r> Ingestor<'r> {
    pub fn new(path: impl Into<PathBuf>, rules: &'r RuleSet) -> Self {
        Self {
            path: path.into(),
            rules,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table name used in log lines and errors: the file name.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn load(&self) -> Result<CleanedTable> {
        let name = self.name();
        info!(table = %name, path = %self.path.display(), "loading");
        let raw = read_csv(&self.path, self.rules).map_err(|e| PipelineError::Read {
            table: name.clone(),
            source: Box::new(e),
        })?;
        pipeline::apply(&name, raw, self.rules)
    }
}
