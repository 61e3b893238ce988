//! Resource fetching behind one async trait, so the pipeline is identical on
//! web (fetch API), native (filesystem), and in tests (in-memory map).

use std::fmt;

#[derive(Debug)]
pub enum FetchError {
    NotFound(String),
    Http { path: String, status: u16 },
    Io { path: String, detail: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound(path) => write!(f, "resource not found: {path}"),
            FetchError::Http { path, status } => {
                write!(f, "http {status} fetching {path}")
            }
            FetchError::Io { path, detail } => write!(f, "error fetching {path}: {detail}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Byte-progress callback: (bytes loaded so far, total if known).
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, Option<u64>);

#[allow(async_fn_in_trait)]
pub trait ResourceFetcher {
    async fn fetch(&self, path: &str, progress: ProgressFn<'_>) -> Result<Vec<u8>, FetchError>;
}

/// Filesystem fetcher for the native demo and tooling.
#[cfg(not(target_arch = "wasm32"))]
pub struct FsFetcher {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsFetcher {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, path: &str, progress: ProgressFn<'_>) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.to_string()),
            _ => FetchError::Io {
                path: path.to_string(),
                detail: e.to_string(),
            },
        })?;
        let total = Some(bytes.len() as u64);
        progress(0, total);
        progress(bytes.len() as u64, total);
        Ok(bytes)
    }
}

/// Fetch-API fetcher for the browser build.
#[cfg(target_arch = "wasm32")]
pub struct WebFetcher;

#[cfg(target_arch = "wasm32")]
impl ResourceFetcher for WebFetcher {
    async fn fetch(&self, path: &str, progress: ProgressFn<'_>) -> Result<Vec<u8>, FetchError> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        let js_err = |detail: String| FetchError::Io {
            path: path.to_string(),
            detail,
        };

        let window = web_sys::window().ok_or_else(|| js_err("no window".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(|e| js_err(format!("{e:?}")))?;
        let resp: web_sys::Response = resp_value
            .dyn_into()
            .map_err(|e| js_err(format!("{e:?}")))?;

        if !resp.ok() {
            let status = resp.status();
            return Err(if status == 404 {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Http {
                    path: path.to_string(),
                    status,
                }
            });
        }

        let total = resp
            .headers()
            .get("Content-Length")
            .ok()
            .flatten()
            .and_then(|v| v.parse().ok());
        progress(0, total);

        let buf_promise = resp.array_buffer().map_err(|e| js_err(format!("{e:?}")))?;
        let buf = JsFuture::from(buf_promise)
            .await
            .map_err(|e| js_err(format!("{e:?}")))?;
        let bytes = js_sys::Uint8Array::new(&buf).to_vec();
        progress(bytes.len() as u64, total.or(Some(bytes.len() as u64)));
        Ok(bytes)
    }
}

/// In-memory fetcher for tests and headless demos.
#[derive(Default)]
pub struct MemFetcher {
    files: std::collections::HashMap<String, Vec<u8>>,
    /// When set, fetches report no total size (indeterminate progress).
    pub hide_sizes: bool,
}

impl MemFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), bytes.into());
    }
}

impl ResourceFetcher for MemFetcher {
    async fn fetch(&self, path: &str, progress: ProgressFn<'_>) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))?;
        let total = if self.hide_sizes {
            None
        } else {
            Some(bytes.len() as u64)
        };
        progress(0, total);
        progress(bytes.len() as u64, total);
        Ok(bytes)
    }
}
