use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::DocumentConfig;
use crate::types::Document;

/// A downloaded file handed to the user, released after `release_at`
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedFile {
    pub path: PathBuf,
    pub size: usize,
    pub release_at: DateTime<Utc>,
}

/// Where fetched document bytes end up
pub trait FileViewer: Send + Sync {
    fn open(&self, document: &Document, bytes: Vec<u8>) -> io::Result<OpenedFile>;
}

/// Writes each opened document to a fresh file and deletes it once the
/// release delay has elapsed, so repeated views do not pile up.
#[derive(Debug, Clone)]
pub struct TempFileViewer {
    dir: PathBuf,
    release_after: Duration,
}

impl TempFileViewer {
    pub fn new(dir: impl Into<PathBuf>, release_after: Duration) -> Self {
        Self {
            dir: dir.into(),
            release_after,
        }
    }

    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(config.viewer_dir(), config.viewer_release_delay())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Release ahead of schedule; the pending timer then finds nothing
    pub fn release_now(&self, file: &OpenedFile) {
        release(&file.path);
    }

    fn schedule_release(&self, path: PathBuf) {
        let delay = self.release_after;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    release(&path);
                });
            }
            Err(_) => {
                tracing::warn!("No async runtime; {} will not be released automatically", path.display());
            }
        }
    }
}

impl FileViewer for TempFileViewer {
    fn open(&self, document: &Document, bytes: Vec<u8>) -> io::Result<OpenedFile> {
        fs::create_dir_all(&self.dir)?;

        let file_name = format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            safe_file_name(document)
        );
        let path = self.dir.join(file_name);
        fs::write(&path, &bytes)?;

        let release_at = Utc::now()
            + chrono::Duration::from_std(self.release_after).unwrap_or_else(|_| chrono::Duration::zero());
        self.schedule_release(path.clone());

        tracing::info!("Opened document {} at {}", document.doc_id, path.display());
        Ok(OpenedFile {
            path,
            size: bytes.len(),
            release_at,
        })
    }
}

fn release(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Released {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to release {}: {}", path.display(), e),
    }
}

/// Last path segment of the stored file (or the document name), with
/// anything outside a conservative character set replaced.
fn safe_file_name(document: &Document) -> String {
    let source = document
        .doc_file
        .as_deref()
        .and_then(|f| f.rsplit('/').next())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| document.display_name());

    let cleaned: String = source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "document".to_string(),
        name => name.to_string(),
    }
}
