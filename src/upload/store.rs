// Upload storage
// Writes accepted images under the uploads directory with collision-free names

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{UploadError, UploadedFile};
use crate::logger;

/// Public path under which stored uploads are served
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Give up after this many consecutive name collisions
const MAX_NAME_ATTEMPTS: i64 = 64;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the uploads directory if it does not exist yet
    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Write `file` to disk and return its public path (`/uploads/<name>`)
    ///
    /// Files are created exclusively; when the name is taken the millisecond
    /// prefix is bumped and the write retried.
    pub async fn store(&self, file: &UploadedFile) -> Result<String, UploadError> {
        fs::create_dir_all(&self.dir).await?;

        let mut stamp = Utc::now().timestamp_millis();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = stored_file_name(stamp, &file.file_name);
            let path = self.dir.join(&name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut handle) => {
                    handle.write_all(&file.data).await?;
                    handle.flush().await?;
                    logger::log_debug(&format!(
                        "[Upload] Stored {} ({} bytes, {})",
                        path.display(),
                        file.data.len(),
                        file.content_type
                    ));
                    return Ok(format!("{PUBLIC_PREFIX}/{name}"));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => stamp += 1,
                Err(e) => return Err(e.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free upload name after repeated collisions",
        )
        .into())
    }

    /// Remove a file previously returned by [`UploadStore::store`]
    ///
    /// Paths outside the uploads directory are ignored.
    pub async fn discard(&self, public_url: &str) {
        let Some(name) = public_url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return;
        }

        let path = self.dir.join(name);
        match fs::remove_file(&path).await {
            Ok(()) => logger::log_debug(&format!("[Upload] Discarded {}", path.display())),
            Err(e) => logger::log_warning(&format!(
                "Failed to discard upload '{}': {e}",
                path.display()
            )),
        }
    }
}

/// Storage name for an upload: `<stamp>_<base><ext>`
///
/// Directory components of the client-supplied name are dropped and every
/// run of whitespace in the base name becomes a single `_`.
pub fn stored_file_name(stamp: i64, original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };

    let base = collapse_whitespace(stem);
    let base = if base.is_empty() { "upload".to_string() } else { base };
    format!("{stamp}_{base}{}", collapse_whitespace(ext))
}

fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
