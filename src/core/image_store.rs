//! Persistence for embedded image payloads.
//!
//! The public directory is shared by every concurrent run without locking,
//! so each file gets a name no other writer can produce: a millisecond
//! timestamp plus a random UUID, opened with `create_new`.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// Writing an image payload failed
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Failed to write image to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes images under a publicly served directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Decode and write a base64 payload, returning its server-relative path
    pub async fn persist_base64(&self, payload: &str) -> Result<String, PersistenceError> {
        let bytes = STANDARD.decode(payload.trim())?;
        self.persist(&bytes).await
    }

    /// Write raw image bytes, returning the server-relative path
    pub async fn persist(&self, bytes: &[u8]) -> Result<String, PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let file_name = unique_file_name();
        let path = self.dir.join(&file_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| PersistenceError::Io {
                path: path.clone(),
                source,
            })?;

        write_or_discard(file, &path, bytes).await?;

        debug!(path = %path.display(), bytes = bytes.len(), "Persisted image");

        Ok(format!(
            "{}/{}",
            self.url_prefix.trim_end_matches('/'),
            file_name
        ))
    }
}

/// Write `bytes` to a freshly created file, removing the file if the write fails
async fn write_or_discard<W>(
    mut writer: W,
    path: &Path,
    bytes: &[u8],
) -> Result<(), PersistenceError>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(bytes).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };
    drop(writer);

    if let Err(source) = written {
        // Nothing references a partial file
        if let Err(e) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove partial image");
        }
        return Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn unique_file_name() -> String {
    format!(
        "page-{}-{}.png",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
