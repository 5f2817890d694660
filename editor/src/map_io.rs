//! Reading and writing RON map files on the background job queue.

use std::path::{Path, PathBuf};

use cartograph_core::document::{DocumentSnapshot, MapDocument, SnapshotError};
use cartograph_core::jobs::{JobError, JobQueue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to encode map: {0}")]
    Encode(#[from] ron::Error),
    #[error("invalid map {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
    #[error(transparent)]
    Job(#[from] JobError),
}

pub fn read_map(path: &Path) -> Result<MapDocument, MapFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| MapFileError::Read {
        path: path.to_owned(),
        source,
    })?;
    let snapshot: DocumentSnapshot = ron::from_str(&text).map_err(|source| MapFileError::Parse {
        path: path.to_owned(),
        source,
    })?;
    MapDocument::from_snapshot(snapshot).map_err(|source| MapFileError::Invalid {
        path: path.to_owned(),
        source,
    })
}

pub fn write_map(path: &Path, snapshot: &DocumentSnapshot) -> Result<(), MapFileError> {
    let text = ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, text).map_err(|source| MapFileError::Write {
        path: path.to_owned(),
        source,
    })
}

#[derive(Debug)]
enum Output {
    Loaded(MapDocument),
    Saved,
}

/// Blocking front for the job queue: each call submits one job and waits.
pub struct MapIo {
    jobs: JobQueue<Output>,
}

impl MapIo {
    pub fn new() -> Self {
        Self {
            jobs: JobQueue::new(),
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<MapDocument, MapFileError> {
        let owned = path.to_owned();
        self.jobs.submit(format!("load {}", path.display()), move || {
            read_map(&owned).map(Output::Loaded)
        });
        match self.wait()? {
            Output::Loaded(doc) => Ok(doc),
            Output::Saved => Err(JobError::Failed("load produced no document".into()).into()),
        }
    }

    /// Serializes on the calling thread, writes on the worker.
    pub fn save(&mut self, path: &Path, doc: &MapDocument) -> Result<(), MapFileError> {
        let snapshot = doc.to_snapshot();
        let owned = path.to_owned();
        self.jobs.submit(format!("save {}", path.display()), move || {
            write_map(&owned, &snapshot).map(|()| Output::Saved)
        });
        self.wait().map(|_| ())
    }

    fn wait(&mut self) -> Result<Output, MapFileError> {
        let job = self.jobs.wait_next().ok_or(JobError::Disconnected)?;
        Ok(job.result?)
    }
}

impl Default for MapIo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartograph_core::map::{EdgeId, EdgeState, GridConfig};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cartograph-{}-{name}.ron", std::process::id()))
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut doc = MapDocument::new(GridConfig::default());
        doc.set_tile_at(3, 4, 2);
        doc.set_edge_state(EdgeId::new(3, 4, 4, 4), EdgeState::Door);
        let path = temp_path("round-trip");

        let mut io = MapIo::new();
        io.save(&path, &doc).unwrap();
        let loaded = io.load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.to_snapshot(), doc.to_snapshot());
    }

    #[test]
    fn missing_file_reports_job_failure() {
        let mut io = MapIo::new();
        let err = io.load(&temp_path("missing")).unwrap_err();
        assert!(matches!(err, MapFileError::Job(JobError::Failed(_))));
    }
}
