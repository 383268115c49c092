use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Why a results document could not be handed to a reader.
#[derive(Debug, thiserror::Error)]
pub enum DataUnavailable {
    #[error("Model results file not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("Error loading model results: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("Invalid JSON format: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Invalid JSON format: expected an object at the top level")]
    NotAnObject,

    /// The file holds an error report written by the training job.
    #[error("{message}")]
    Tagged { message: String, payload: Value },
}

impl DataUnavailable {
    /// Body returned to API clients: the stored error report verbatim, or
    /// `{"error": <message>}` for load failures.
    pub fn payload(&self) -> Value {
        match self {
            DataUnavailable::Tagged { payload, .. } => payload.clone(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("cannot prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot move results into {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// File-backed home of the results document.
///
/// Readers get a fresh copy on every [`load`](Self::load); writers replace
/// the file through a sibling temp file and a rename, so a concurrent reader
/// sees either the old or the new document.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the results file (`.` for a bare file name).
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the document.
    pub fn load(&self) -> Result<Value, DataUnavailable> {
        log::debug!("loading results from {}", self.path.display());
        if !self.path.exists() {
            return Err(DataUnavailable::Missing {
                path: self.path.clone(),
            });
        }
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataUnavailable::Missing {
                path: self.path.clone(),
            },
            _ => DataUnavailable::Unreadable(e),
        })?;
        let doc: Value = serde_json::from_slice(&bytes).map_err(DataUnavailable::Malformed)?;

        let Some(object) = doc.as_object() else {
            return Err(DataUnavailable::NotAnObject);
        };
        if let Some(error) = object.get("error") {
            let message = error
                .as_str()
                .map(str::to_owned)
                .unwrap_or_else(|| error.to_string());
            return Err(DataUnavailable::Tagged {
                message,
                payload: doc,
            });
        }
        Ok(doc)
    }

    /// Serialize `doc` as pretty JSON and atomically replace the file,
    /// creating the containing directory if needed.
    pub fn write<T: Serialize + ?Sized>(&self, doc: &T) -> Result<(), WriteError> {
        let dir = self.dir();
        std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');

        let io_err = |source| WriteError::Io {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|source| WriteError::Persist {
            path: self.path.clone(),
            source,
        })?;

        log::info!("wrote results to {}", self.path.display());
        Ok(())
    }
}
