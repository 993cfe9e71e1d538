//! Shared test utilities for the immich-tools test suite.
//!
//! Provides a directory tree builder for grouping tests and [`MockRemote`],
//! an in-memory server that implements both remote traits and records every
//! call it receives.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! make_tree(tmp.path(), &["1/food/fruit", "2/food"]);
//!
//! let remote = MockRemote::new()
//!     .with_album("a1", "food")
//!     .with_assets("/1/food", &["x", "y"]);
//!
//! // ... run the orchestrator ...
//!
//! assert_eq!(remote.created_albums(), vec!["fruit"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::ApiError;
use crate::remote::{Album, AlbumRepository, AssetLookup};

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Create every directory in `dirs` (with parents) below `root`.
pub fn make_tree(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
}

// =========================================================================
// Mock remote
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedOp {
    ListAlbums,
    CreateAlbum(String),
    AddAssets {
        album_id: String,
        asset_ids: Vec<String>,
    },
    Lookup(String),
}

/// In-memory server that records operations.
///
/// Uses Mutex and atomics so it is Sync and can be shared across the tasks
/// spawned by the asset resolver.
#[derive(Default)]
pub struct MockRemote {
    albums: Mutex<Vec<Album>>,
    assets: BTreeMap<String, Vec<String>>,
    failing_lookups: BTreeSet<String>,
    fail_attach: bool,
    fail_create: bool,
    lookup_delay: Option<Duration>,
    slow_lookups: BTreeMap<String, Duration>,
    next_id: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pub operations: Mutex<Vec<RecordedOp>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_album(self, id: &str, name: &str) -> Self {
        self.albums.lock().unwrap().push(Album {
            id: id.to_string(),
            name: name.to_string(),
            asset_count: 0,
        });
        self
    }

    pub fn with_assets(mut self, path: &str, ids: &[&str]) -> Self {
        self.assets
            .insert(path.to_string(), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Lookups of `path` fail with a 500 error.
    pub fn failing_lookup(mut self, path: &str) -> Self {
        self.failing_lookups.insert(path.to_string());
        self
    }

    pub fn failing_attach(mut self) -> Self {
        self.fail_attach = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Every lookup sleeps for `delay` before answering.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Lookups of `path` sleep for `delay`, overriding the global delay.
    pub fn with_slow_lookup(mut self, path: &str, delay: Duration) -> Self {
        self.slow_lookups.insert(path.to_string(), delay);
        self
    }

    pub fn get_operations(&self) -> Vec<RecordedOp> {
        self.operations.lock().unwrap().clone()
    }

    /// Names passed to `create_album`, in call order.
    pub fn created_albums(&self) -> Vec<String> {
        self.get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::CreateAlbum(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Asset ids attached per album id, sorted for stable comparison.
    pub fn attached(&self) -> BTreeMap<String, Vec<String>> {
        let mut attached: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for op in self.get_operations() {
            if let RecordedOp::AddAssets {
                album_id,
                mut asset_ids,
            } = op
            {
                asset_ids.sort();
                attached.entry(album_id).or_default().extend(asset_ids);
            }
        }
        attached
    }

    /// Highest number of lookups observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, op: RecordedOp) {
        self.operations.lock().unwrap().push(op);
    }
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl AlbumRepository for MockRemote {
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError> {
        self.record(RecordedOp::ListAlbums);
        Ok(self.albums.lock().unwrap().clone())
    }

    async fn create_album(&self, name: &str) -> Result<Album, ApiError> {
        self.record(RecordedOp::CreateAlbum(name.to_string()));
        if self.fail_create {
            return Err(server_error("album creation failed"));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let album = Album {
            id: format!("new-{n}"),
            name: name.to_string(),
            asset_count: 0,
        };
        self.albums.lock().unwrap().push(album.clone());
        Ok(album)
    }

    async fn add_assets(&self, album_id: &str, asset_ids: &[String]) -> Result<(), ApiError> {
        self.record(RecordedOp::AddAssets {
            album_id: album_id.to_string(),
            asset_ids: asset_ids.to_vec(),
        });
        if self.fail_attach {
            return Err(server_error("attach failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetLookup for MockRemote {
    async fn assets_in_folder(&self, path: &str) -> Result<Vec<String>, ApiError> {
        self.record(RecordedOp::Lookup(path.to_string()));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = self.slow_lookups.get(path).copied().or(self.lookup_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_lookups.contains(path) {
            return Err(server_error(&format!("lookup of {path} failed")));
        }
        Ok(self.assets.get(path).cloned().unwrap_or_default())
    }
}
