use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;

use crate::foundation::error::{PorticoError, PorticoResult};
use crate::steps::model::Step;

/// Supplier of the ordered step definitions for a product.
///
/// Called once per session start; the result replaces the store's step list wholesale.
pub trait StepSource {
    /// Fetch the full ordered step list.
    fn fetch_steps(&self) -> PorticoResult<Vec<Step>>;
}

/// Step definitions read from a JSON array on disk.
#[derive(Clone, Debug)]
pub struct JsonStepSource {
    path: PathBuf,
}

impl JsonStepSource {
    /// Source backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StepSource for JsonStepSource {
    fn fetch_steps(&self) -> PorticoResult<Vec<Step>> {
        let f = File::open(&self.path)
            .with_context(|| format!("open step definitions '{}'", self.path.display()))?;
        let steps: Vec<Step> = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| PorticoError::serde(format!("parse step definitions: {e}")))?;
        validate_steps(&steps)?;
        Ok(steps)
    }
}

/// Step definitions held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticStepSource(pub Vec<Step>);

impl StepSource for StaticStepSource {
    fn fetch_steps(&self) -> PorticoResult<Vec<Step>> {
        validate_steps(&self.0)?;
        Ok(self.0.clone())
    }
}

/// Reject step lists the store cannot navigate: blank or duplicate step ids.
pub fn validate_steps(steps: &[Step]) -> PorticoResult<()> {
    let mut seen = std::collections::HashSet::new();
    for s in steps {
        if s.id.trim().is_empty() {
            return Err(PorticoError::validation("step id must be non-empty"));
        }
        if !seen.insert(s.id.as_str()) {
            return Err(PorticoError::validation(format!(
                "duplicate step id '{}'",
                s.id
            )));
        }
    }
    Ok(())
}
