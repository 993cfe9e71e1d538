//! Concurrent asset resolution.
//!
//! [`resolve_many`] turns a list of original paths into the asset ids stored
//! under them. Each path is looked up in its own task; results come back as
//! task return values and are concatenated in completion order.
//!
//! The first failed lookup cancels the rest through a shared
//! [`CancellationToken`]. Lookups still in flight are dropped at their next
//! await point, and queued ones never start. Results that already arrived
//! are discarded, so the call either returns every id or an error.
//!
//! Without a limit every path gets a lookup at once. With a limit, a
//! semaphore caps how many run at the same time.

use crate::client::ApiError;
use crate::remote::AssetLookup;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("one of the paths failed to retrieve assets: {0}")]
    Lookup(#[source] ApiError),
    #[error("asset lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Resolve the asset ids under every path in `paths`.
///
/// `limit` caps concurrent lookups; `None` runs them all at once. The order
/// of the returned ids is unspecified.
pub async fn resolve_many<L>(
    lookup: Arc<L>,
    paths: &[String],
    limit: Option<usize>,
) -> Result<Vec<String>, ResolveError>
where
    L: AssetLookup + ?Sized + 'static,
{
    let cancel = CancellationToken::new();
    let permits = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let mut tasks = JoinSet::new();

    for path in paths {
        let lookup = Arc::clone(&lookup);
        let cancel = cancel.clone();
        let permits = permits.clone();
        let path = path.clone();

        tasks.spawn(async move {
            let _permit = match permits {
                Some(permits) => tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(None),
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => return Ok(None),
                    },
                },
                None => None,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Ok(None),
                ids = lookup.assets_in_folder(&path) => ids.map(|ids| {
                    debug!(path, assets = ids.len(), "resolved folder");
                    Some(ids)
                }),
            }
        });
    }

    let mut assets = Vec::new();
    let mut failure = None;

    while let Some(joined) = tasks.join_next().await {
        let err = match joined {
            Ok(Ok(Some(ids))) => {
                if failure.is_none() {
                    assets.extend(ids);
                }
                continue;
            }
            Ok(Ok(None)) => continue,
            Ok(Err(err)) => ResolveError::Lookup(err),
            Err(err) => ResolveError::Task(err),
        };

        if failure.is_none() {
            warn!(error = %err, "asset lookup failed, cancelling remaining lookups");
            cancel.cancel();
            failure = Some(err);
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(assets),
    }
}
