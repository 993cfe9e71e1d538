//! Album commands: auto-create from folders, and listing.
//!
//! [`auto_create_albums`] runs the whole pipeline:
//!
//! ```text
//! 1. Group     folder tree    →  album name → folders       (group)
//! 2. Reconcile album names    →  album id → folders         (list + create)
//! 3. Resolve   folders        →  asset ids per album        (resolve)
//! 4. Attach    asset ids      →  album                      (one call per album)
//! ```
//!
//! Album names are matched against the server by exact string equality.
//! Albums created during the run join the known list, so two folder groups
//! renamed to the same album share one album.
//!
//! The first error aborts the run. Nothing is rolled back: albums created
//! before a failed attach stay on the server.

use crate::client::ApiError;
use crate::config::AutoCreateOptions;
use crate::group::{GroupError, group_albums};
use crate::remote::{Album, AlbumRepository, AssetLookup};
use crate::resolve::{ResolveError, resolve_many};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AutoCreateError {
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoCreateSummary {
    /// Existing albums that received assets.
    pub reused: Vec<String>,
    /// Albums created by this run.
    pub created: Vec<String>,
    /// Total asset ids sent across all attach calls.
    pub assets_attached: usize,
}

impl AutoCreateSummary {
    pub fn is_empty(&self) -> bool {
        self.reused.is_empty() && self.created.is_empty()
    }
}

/// Group the folder tree and sync the groups into albums on the server.
///
/// Returns an empty summary without contacting the server when no folder
/// produces an album name.
pub async fn auto_create_albums<S>(
    service: Arc<S>,
    opts: &AutoCreateOptions,
) -> Result<AutoCreateSummary, AutoCreateError>
where
    S: AlbumRepository + AssetLookup + 'static,
{
    let groups = group_albums(opts)?;
    if groups.is_empty() {
        info!(folder = opts.folder, "no folders to group");
        return Ok(AutoCreateSummary::default());
    }
    debug!(groups = groups.len(), "grouped folders");

    let mut known = service.list_albums().await?;
    let mut summary = AutoCreateSummary::default();
    let mut items: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, folders) in groups {
        let id = match known.iter().find(|a| a.name == name) {
            Some(album) => {
                if !summary.reused.contains(&album.name) {
                    summary.reused.push(album.name.clone());
                }
                album.id.clone()
            }
            None => {
                let album = service.create_album(&name).await?;
                info!(album = album.name, id = album.id, "created album");
                summary.created.push(album.name.clone());
                let id = album.id.clone();
                known.push(Album { name, ..album });
                id
            }
        };
        items.entry(id).or_default().extend(folders);
    }

    for (id, paths) in items {
        let assets = resolve_many(Arc::clone(&service), &paths, opts.max_concurrent_lookups).await?;
        service.add_assets(&id, &assets).await?;
        info!(id, folders = paths.len(), assets = assets.len(), "attached assets");
        summary.assets_attached += assets.len();
    }

    Ok(summary)
}

/// All albums on the server, sorted by name.
pub async fn list_albums<R: AlbumRepository + ?Sized>(repo: &R) -> Result<Vec<Album>, ApiError> {
    let mut albums = repo.list_albums().await?;
    albums.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(albums)
}
