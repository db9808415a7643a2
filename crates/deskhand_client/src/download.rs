use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::http::BinaryBody;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing. Unwritable
/// directories surface on the first atomic write.
pub fn ensure_download_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::DownloadDir(format!(
            "{} is not a directory",
            dir.display()
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| PersistError::DownloadDir(e.to_string()))
        }
        Err(err) => Err(PersistError::DownloadDir(err.to_string())),
    }
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_download_dir(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;

        let target = self.dir.join(filename);
        match tmp.persist(&target) {
            Ok(_) => Ok(target),
            // The rename cannot replace an existing file on every platform;
            // unlink the old download and retry once.
            Err(persist_err) if target.exists() => {
                fs::remove_file(&target)?;
                persist_err
                    .file
                    .persist(&target)
                    .map_err(|e| PersistError::Io(e.error))?;
                Ok(target)
            }
            Err(persist_err) => Err(PersistError::Io(persist_err.error)),
        }
    }
}

/// Names and persists downloaded bodies. The timestamp used for fallback
/// names is injected so this crate needs no clock.
pub struct DownloadStore {
    dir: PathBuf,
    now_stamp: Arc<dyn Fn() -> String + Send + Sync>,
}

impl DownloadStore {
    pub fn new(dir: PathBuf, now_stamp: Arc<dyn Fn() -> String + Send + Sync>) -> Self {
        Self { dir, now_stamp }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves a binary response, named after its `Content-Disposition` header
    /// when one is present, `{prefix}_{timestamp}.{ext}` otherwise.
    pub fn save_body(
        &self,
        body: &BinaryBody,
        fallback_prefix: &str,
        fallback_ext: &str,
    ) -> Result<PathBuf, PersistError> {
        let filename = body
            .content_disposition
            .as_deref()
            .and_then(disposition_filename)
            .map(|name| sanitize_filename(&name))
            .unwrap_or_else(|| {
                format!("{fallback_prefix}_{}.{fallback_ext}", (self.now_stamp)())
            });
        AtomicFileWriter::new(self.dir.clone()).write(&filename, &body.bytes)
    }

    /// Saves content under a server-proposed name.
    pub fn save_named(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        AtomicFileWriter::new(self.dir.clone()).write(&sanitize_filename(filename), content)
    }
}

/// Extracts the filename from a `Content-Disposition` header value.
pub fn disposition_filename(header: &str) -> Option<String> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("filename=") {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Windows-safe filename: forbidden characters replaced, length capped,
/// reserved device names suffixed.
pub fn sanitize_filename(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "download".to_string();
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut final_name = compacted;
    if final_name.len() > 120 {
        let mut end = 120;
        while end > 0 && !final_name.is_char_boundary(end) {
            end -= 1;
        }
        final_name.truncate(end);
    }
    let stem_len = final_name
        .split('.')
        .next()
        .map(str::len)
        .unwrap_or(final_name.len());
    if is_reserved_windows_name(&final_name[..stem_len]) {
        final_name.insert(stem_len, '_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    c.is_control() || matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Legacy DOS device names (plus COM1-9/LPT1-9) are invalid filenames on
/// Windows regardless of extension.
fn is_reserved_windows_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            upper.len() == 4
                && (upper.starts_with("COM") || upper.starts_with("LPT"))
                && upper.as_bytes()[3].is_ascii_digit()
                && upper.as_bytes()[3] != b'0'
        }
    }
}
