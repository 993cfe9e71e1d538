//! Server information: versions, disk usage and library statistics.
//!
//! The three endpoints are independent, so they are requested concurrently
//! and the command fails if any of them does.

use crate::client::{ApiError, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("one of the server information requests failed: {0}")]
pub struct InfoError(#[from] pub ApiError);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct About {
    pub version: String,
    pub nodejs: String,
    pub imagemagick: String,
    pub exiftool: String,
    pub ffmpeg: String,
    pub libvips: String,
    pub build: String,
}

/// Disk usage in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    #[serde(rename = "diskSizeRaw")]
    pub size: u64,
    #[serde(rename = "diskUseRaw")]
    pub used: u64,
    #[serde(rename = "diskAvailableRaw")]
    pub available: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub photos: u64,
    pub videos: u64,
    /// Bytes used by the library.
    pub usage: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub about: About,
    pub storage: Storage,
    pub stats: Stats,
}

pub async fn server_info(client: &Client) -> Result<ServerInfo, InfoError> {
    let (about, storage, stats) = tokio::try_join!(
        client.get::<About>("/api/server/about"),
        client.get::<Storage>("/api/server/storage"),
        client.get::<Stats>("/api/server/statistics"),
    )?;

    Ok(ServerInfo {
        about,
        storage,
        stats,
    })
}
