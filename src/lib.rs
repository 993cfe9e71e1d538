//! # Immich Tools
//!
//! Command-line tools for an [Immich](https://immich.app) photo server. The
//! main feature turns a folder tree into albums: point it at the library the
//! server imports from and every folder ends up in an album named after it.
//!
//! # Architecture: Auto-Create Pipeline
//!
//! ```text
//! 1. Group      folder tree   →  album name → folder paths     (local, sequential)
//! 2. Reconcile  album names   →  album ids (existing or new)   (server, sequential)
//! 3. Resolve    folder paths  →  asset ids                     (server, concurrent)
//! 4. Attach     asset ids     →  album                         (server, one call per album)
//! ```
//!
//! Grouping is a pure function of the options and the filesystem, so it is
//! tested without a server. The server side sits behind two traits
//! ([`remote::AlbumRepository`], [`remote::AssetLookup`]); tests run the
//! orchestrator against an in-memory mock and the HTTP client against a
//! local mock server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pattern`] | Glob → regex compiler and the exclusion filter built from it |
//! | [`config`] | `AutoCreateOptions`, batch config files (JSON/TOML), rename pairs, stock config |
//! | [`group`] | Folder grouping: walks the tree and assigns folders to album names |
//! | [`client`] | HTTP envelope: headers, API key, status → error mapping |
//! | [`remote`] | Album/asset traits and their Immich implementation |
//! | [`resolve`] | Concurrent folder → asset id lookups with cancellation on first failure |
//! | [`albums`] | `auto_create_albums` orchestrator and album listing |
//! | [`info`] | Server version, storage and statistics |
//! | [`auth`] | Stored credentials: login, logout, session |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Claim Once, Then Cascade
//!
//! A folder can be recorded under every album name it reaches that already
//! exists, but it creates at most one new name: the first of its segments
//! not yet seen. Walk order is therefore part of the behaviour, which is why
//! the walk is lexical and results use ordered maps. See [`group`].
//!
//! ## Exclusion Does Not Prune
//!
//! An excluded folder is left out of every album, but its sub-folders are
//! still walked and judged on their own. Exclude `/trip*` rather than
//! `{{/trip$}}` to drop a whole subtree.
//!
//! ## All or Nothing, Without Rollback
//!
//! The first error stops the run and is reported as is. Nothing is retried
//! and albums created before the failure are kept.

pub mod albums;
pub mod auth;
pub mod client;
pub mod config;
pub mod group;
pub mod info;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod remote;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_helpers;
