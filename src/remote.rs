//! Remote album repository and asset lookup.
//!
//! Two traits separate the orchestration logic from the server:
//!
//! - [`AlbumRepository`]: list, create and fill albums.
//! - [`AssetLookup`]: find the assets stored under an original path.
//!
//! [`Client`] implements both against the Immich API. Tests substitute an
//! in-memory recording mock.

use crate::client::{ApiError, Client};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An album stored on the server. Albums are matched by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    #[serde(rename = "albumName")]
    pub name: String,
    #[serde(rename = "assetCount", default)]
    pub asset_count: u64,
}

#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// All albums visible to the current user.
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError>;

    /// Create an empty album. The server does not deduplicate names.
    async fn create_album(&self, name: &str) -> Result<Album, ApiError>;

    async fn add_assets(&self, album_id: &str, asset_ids: &[String]) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AssetLookup: Send + Sync {
    /// Identifiers of the assets located directly under `path`, as the
    /// server knows it.
    async fn assets_in_folder(&self, path: &str) -> Result<Vec<String>, ApiError>;
}

#[derive(Deserialize)]
struct AssetRef {
    id: String,
}

#[async_trait]
impl AlbumRepository for Client {
    async fn list_albums(&self) -> Result<Vec<Album>, ApiError> {
        self.get("/api/albums").await
    }

    async fn create_album(&self, name: &str) -> Result<Album, ApiError> {
        self.post("/api/albums", &json!({ "albumName": name })).await
    }

    async fn add_assets(&self, album_id: &str, asset_ids: &[String]) -> Result<(), ApiError> {
        self.put(
            &format!("/api/albums/{album_id}/assets"),
            &json!({ "ids": asset_ids }),
        )
        .await
    }
}

#[async_trait]
impl AssetLookup for Client {
    async fn assets_in_folder(&self, path: &str) -> Result<Vec<String>, ApiError> {
        let assets: Vec<AssetRef> = self
            .get_with_query("/api/view/folder", &[("path", path)])
            .await?;
        Ok(assets.into_iter().map(|a| a.id).collect())
    }
}
