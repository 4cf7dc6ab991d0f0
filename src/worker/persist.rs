//! On-disk copy of the named shell caches, so a new cache version finds the
//! caches of the previous run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::request::{CachedResponse, ResponseType};
use super::storage::{CacheStorage, NamedCache};
use super::WorkerError;

const FILE_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCache {
    name: String,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    status: u16,
    #[serde(default)]
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    response_type: ResponseType,
    #[serde(default)]
    pinned: bool,
}

impl StoredEntry {
    fn new(key: &str, response: &CachedResponse, pinned: bool) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Self {
            key: key.to_string(),
            status: response.status.as_u16(),
            headers,
            body: response.body.to_vec(),
            response_type: response.response_type,
            pinned,
        }
    }

    fn into_response(self) -> Result<(String, CachedResponse, bool), WorkerError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|e| WorkerError::Storage(format!("{}: {e}", self.key)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                headers.append(name, value);
            }
        }

        let response = CachedResponse {
            status,
            headers,
            body: Bytes::from(self.body),
            response_type: self.response_type,
        };
        Ok((self.key, response, self.pinned))
    }
}

/// Directory holding one JSON file per named cache.
#[derive(Debug, Clone)]
pub struct ShellCacheDir {
    dir: PathBuf,
}

impl ShellCacheDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, name: &str) -> Result<PathBuf, WorkerError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(WorkerError::Storage(format!("invalid cache name {name:?}")));
        }
        Ok(self.dir.join(format!("{name}.{FILE_EXTENSION}")))
    }

    /// Reads every stored cache into a fresh storage.
    ///
    /// A missing directory gives an empty storage. Unreadable files are
    /// skipped with a warning.
    pub async fn load(&self, capacity: usize) -> Result<CacheStorage, WorkerError> {
        let mut storage = CacheStorage::new(capacity);

        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(storage),
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        while let Some(entry) = dir.next_entry().await.map_err(|e| io_error(&self.dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            match read_cache(&path, capacity).await {
                Ok(cache) => {
                    debug!("Loaded shell cache {} ({} entries)", cache.name(), cache.len());
                    storage.insert(cache);
                }
                Err(e) => warn!("Skipping shell cache file {}: {}", path.display(), e),
            }
        }
        Ok(storage)
    }

    /// Writes `cache`, replacing its previous copy.
    pub async fn save(&self, cache: &NamedCache) -> Result<(), WorkerError> {
        let path = self.file_for(cache.name())?;
        let stored = StoredCache {
            name: cache.name().to_string(),
            entries: cache
                .entries_oldest_first()
                .into_iter()
                .map(|(key, response, pinned)| StoredEntry::new(key, response, pinned))
                .collect(),
        };
        let json = serde_json::to_vec(&stored).map_err(|e| WorkerError::Storage(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;
        let partial = path.with_extension("tmp");
        tokio::fs::write(&partial, json)
            .await
            .map_err(|e| io_error(&partial, e))?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| io_error(&path, e))
    }

    /// Deletes the stored copy of `name`, if there is one.
    pub async fn remove(&self, name: &str) -> Result<(), WorkerError> {
        let path = self.file_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

async fn read_cache(path: &Path, capacity: usize) -> Result<NamedCache, WorkerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    let stored: StoredCache = serde_json::from_slice(&bytes)
        .map_err(|e| WorkerError::Storage(format!("{}: {e}", path.display())))?;

    let mut cache = NamedCache::new(&stored.name, capacity);
    for entry in stored.entries {
        let (key, response, pinned) = entry.into_response()?;
        if pinned {
            cache.pin(key, response)?;
        } else {
            cache.put(key, response)?;
        }
    }
    Ok(cache)
}

fn io_error(path: &Path, e: std::io::Error) -> WorkerError {
    WorkerError::Storage(format!("{}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    fn cached(body: &'static str) -> CachedResponse {
        let mut response = CachedResponse::new(StatusCode::OK, body);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        response
    }

    #[tokio::test]
    async fn test_saved_cache_is_loaded_with_pins_and_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ShellCacheDir::new(tmp.path());

        let mut storage = CacheStorage::new(3);
        let cache = storage.open("triptrack-cache-v1");
        cache.pin("http://app.local/index.html".into(), cached("<html>")).unwrap();
        cache.put("http://app.local/a.js".into(), cached("a")).unwrap();
        cache.put("http://app.local/b.js".into(), cached("b")).unwrap();
        dir.save(storage.get("triptrack-cache-v1").unwrap()).await.unwrap();

        let mut loaded = dir.load(3).await.unwrap();
        assert_eq!(loaded.keys(), vec!["triptrack-cache-v1"]);
        let cache = loaded.open("triptrack-cache-v1");
        assert!(cache.is_pinned("http://app.local/index.html"));
        let page = cache.get("http://app.local/index.html").unwrap();
        assert_eq!(page.body, "<html>");
        assert_eq!(page.headers[CONTENT_TYPE], "text/html");

        // "a.js" is still the least recently used entry
        cache.put("http://app.local/c.js".into(), cached("c")).unwrap();
        assert!(!cache.contains("http://app.local/a.js"));
        assert!(cache.contains("http://app.local/b.js"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ShellCacheDir::new(tmp.path().join("not-created"));

        let storage = dir.load(8).await.unwrap();
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_corrupt_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ShellCacheDir::new(tmp.path());

        let mut storage = CacheStorage::default();
        storage.open("triptrack-cache-v1").pin("k".into(), cached("x")).unwrap();
        dir.save(storage.get("triptrack-cache-v1").unwrap()).await.unwrap();
        tokio::fs::write(tmp.path().join("broken.json"), b"{not json").await.unwrap();

        assert_eq!(dir.load(8).await.unwrap().keys(), vec!["triptrack-cache-v1"]);

        dir.remove("triptrack-cache-v1").await.unwrap();
        dir.remove("triptrack-cache-v1").await.unwrap();
        assert!(dir.load(8).await.unwrap().keys().is_empty());
    }

    #[tokio::test]
    async fn test_cache_names_cannot_leave_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ShellCacheDir::new(tmp.path());

        let err = dir.remove("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, WorkerError::Storage(_)));
    }
}
