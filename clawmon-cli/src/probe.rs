//! Process probe backed by a JSON snapshot file.

use std::path::PathBuf;

use tracing::{debug, warn};

use clawmon_core::error::ClawmonError;
use clawmon_core::pipeline::ProcessProbe;
use clawmon_core::types::ProcessSample;

/// Reads process samples from a JSON file written by an external sampler.
///
/// The file holds either a list of samples or `{"processes": [...]}`.
/// A missing file yields no samples.
#[derive(Debug, Clone)]
pub struct SnapshotProbe {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<ProcessSample>),
    Wrapped { processes: Vec<ProcessSample> },
}

impl SnapshotProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn collector_error(&self, reason: impl ToString) -> ClawmonError {
        ClawmonError::Collector {
            name: self.name().to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl ProcessProbe for SnapshotProbe {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn sample(&self) -> Result<Vec<ProcessSample>, ClawmonError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "process snapshot not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(ClawmonError::Io(e)),
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            self.collector_error(format!("{}: {}", self.path.display(), e))
        })?;
        let samples = match snapshot {
            Snapshot::List(samples) | Snapshot::Wrapped { processes: samples } => samples,
        };
        debug!(path = %self.path.display(), samples = samples.len(), "process snapshot read");
        Ok(samples)
    }
}
