use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;

use crate::error::{Error, Result};

/// Cached content and derived filename of a file source.
#[derive(Debug)]
pub struct CachedFile {
    pub content: Bytes,
    pub filename: String,
}

/// Process-wide cache of file contents referenced by templates.
///
/// A source is loaded at most once: concurrent loaders may race on the
/// fetch, but only the first published entry becomes visible and later
/// loads are discarded.
pub struct FileCache {
    cache: DashMap<String, Arc<CachedFile>>,
    request_timeout: Duration,
}

impl FileCache {
    pub fn new(request_timeout: Duration) -> Self {
        FileCache {
            cache: DashMap::new(),
            request_timeout,
        }
    }

    /// Resolves `source` to cached bytes, loading on first use.
    /// `http://` and `https://` sources are fetched with a GET; anything
    /// else is a local path, relative to the working directory.
    pub fn get_or_load(&self, source: &str) -> Result<Arc<CachedFile>> {
        if let Some(hit) = self.cache.get(source) {
            return Ok(Arc::clone(&hit));
        }

        let file = if source.starts_with("http://") || source.starts_with("https://") {
            self.fetch_url(source)?
        } else {
            read_local_file(source)?
        };

        // First successful publisher wins; a concurrently loaded duplicate
        // is dropped here and the published entry returned instead.
        let entry = self
            .cache
            .entry(source.to_owned())
            .or_insert_with(|| Arc::new(file));
        Ok(Arc::clone(&entry))
    }

    fn fetch_url(&self, url: &str) -> Result<CachedFile> {
        let timeout = self.request_timeout;
        // The template pipeline is synchronous, so the fetch runs a blocking
        // client on its own thread instead of touching the async runtime.
        let joined = std::thread::scope(|scope| {
            scope
                .spawn(move || -> Result<CachedFile> {
                    let client = reqwest::blocking::Client::builder()
                        .timeout(timeout)
                        .build()?;
                    let resp = client.get(url).send()?;
                    let status = resp.status();
                    if status != reqwest::StatusCode::OK {
                        return Err(Error::HttpStatus {
                            url: url.to_owned(),
                            status: status.as_u16(),
                        });
                    }
                    Ok(CachedFile {
                        content: resp.bytes()?,
                        filename: filename_from_url(url),
                    })
                })
                .join()
        });
        match joined {
            Ok(result) => result,
            Err(_) => Err(Error::Other(format!("fetching {url} panicked"))),
        }
    }
}

fn read_local_file(path: &str) -> Result<CachedFile> {
    let content = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_owned(),
        source,
    })?;
    let filename = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_owned());
    Ok(CachedFile {
        content: Bytes::from(content),
        filename,
    })
}

fn filename_from_url(raw: &str) -> String {
    let path = match url::Url::parse(raw) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => raw.split(['?', '#']).next().unwrap_or("").to_owned(),
    };
    let base = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let base = base.split('?').next().unwrap_or("");
    if base.is_empty() || base == "." {
        "downloaded_file".to_owned()
    } else {
        base.to_owned()
    }
}
