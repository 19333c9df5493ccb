//! Loading whole data directories.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{Document, Error, Kind, parse_document};

/// A document that could not be loaded.
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub error: Error,
}

/// The outcome of loading a directory: every document that parsed, and
/// every one that did not.
#[derive(Debug, Default)]
pub struct Batch {
    pub documents: Vec<(PathBuf, Document)>,
    pub failures: Vec<Failure>,
}

impl Batch {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse every `*.xml` file under `dir`.
///
/// With `kind` set, every file is parsed as that kind; otherwise the kind is
/// detected per file. A file that fails to load is reported in
/// [`Batch::failures`] and the rest of the directory is still loaded.
pub fn load_dir(dir: &Path, kind: Option<Kind>) -> Batch {
    let mut batch = Batch::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                batch.failures.push(Failure {
                    path,
                    error: err.into(),
                });
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "xml") {
            continue;
        }

        match load_file(path, kind) {
            Ok(document) => {
                debug!(path = %path.display(), name = document.name(), "loaded");
                batch.documents.push((path.to_path_buf(), document));
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping document");
                batch.failures.push(Failure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    debug!(
        dir = %dir.display(),
        loaded = batch.documents.len(),
        failed = batch.failures.len(),
        "directory loaded"
    );
    batch
}

fn load_file(path: &Path, kind: Option<Kind>) -> Result<Document, Error> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match kind {
        Some(kind) => kind.parse(&source),
        None => parse_document(&source),
    }
}
