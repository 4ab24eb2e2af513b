//! Evidence object store
//!
//! Evidence files land under `evidencias/<planId>/<timestamp>-<random>-<filename>`
//! with the content type inferred from the file extension. The store is a
//! trait so the filesystem backend can be swapped for a remote one without
//! touching handlers; keys and URLs keep the same shape either way.

use rand::Rng;
use relevo_common::session::now_ms;
use relevo_common::{Error, Result};
use std::path::PathBuf;

/// Storage backend for evidence files
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`, returning the public URL of the object
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String>;
}

/// Filesystem-backed object store rooted at the configured storage folder
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        // Keys are server-generated; reject anything that could escape the root
        if key.contains("..") || key.starts_with('/') {
            return Err(Error::InvalidInput(format!("Invalid storage key: {}", key)));
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;

        Ok(format!("/almacen/{}", key))
    }
}

/// Build the storage key for an evidence file
pub fn evidence_key(plan_id: &str, filename: &str) -> String {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..1_000_000);
    format!(
        "evidencias/{}/{}-{}-{}",
        plan_id,
        now_ms(),
        random,
        sanitize_filename(filename)
    )
}

/// Strip path separators and control characters from a client filename
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "_");
    if cleaned.is_empty() {
        "archivo".to_string()
    } else {
        cleaned
    }
}

/// Content type from file extension; unknown extensions fall back to
/// application/octet-stream
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "csv" => "text/csv",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
