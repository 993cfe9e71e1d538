//! Folder grouping: turns a directory tree into album names.
//!
//! The first stage of `album auto-create`. Walks the tree below the scan root
//! and assigns every folder to one or more album names, producing a
//! [`GroupResult`] that the orchestrator reconciles against the server.
//!
//! ## Walk
//!
//! The walk starts at `dirname(folder)` (so `/photos/` scans `/photos`) and
//! visits directories depth-first in lexical order. Files are never grouped.
//! Without `recursive`, directories more than one level below the root are
//! pruned.
//!
//! ## Naming
//!
//! For each folder:
//!
//! 1. The root prefix is replaced by `dirname(original_path)` so paths match
//!    what the server stores.
//! 2. Folders matching an exclude pattern are skipped. Their sub-folders are
//!    still walked and judged on their own.
//! 3. The path is split on the separator and the first `skip_levels + 1`
//!    segments are dropped. Folders with nothing left are skipped.
//! 4. Without `parent_group_assets` only the last segment is kept.
//! 5. Each kept segment, outermost first, is renamed and looked up. A name
//!    seen before gets the folder appended and the next segment is tried. A
//!    new name is claimed with this folder and the remaining segments are
//!    ignored.
//!
//! Step 5 means a folder registers under every already-known ancestor name
//! but originates at most one new album. With the tree `1/food/fruit` and
//! `parent_group_assets`, `food` collects both `1/food` and `1/food/fruit`
//! while `fruit` collects only `1/food/fruit`.
//!
//! ```text
//! /m/1/food        → food: [/m/1/food]
//! /m/1/food/fruit  → food: [.., /m/1/food/fruit]   fruit: [/m/1/food/fruit]
//! ```

use crate::config::AutoCreateOptions;
use crate::pattern::{ExcludeFilter, PatternError};
use std::collections::BTreeMap;
use std::path::MAIN_SEPARATOR;
use thiserror::Error;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("unable to walk folder tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Album name → folder paths assigned to it, in walk order.
pub type GroupResult = BTreeMap<String, Vec<String>>;

/// Walk `opts.folder` and group its folders by album name.
pub fn group_albums(opts: &AutoCreateOptions) -> Result<GroupResult, GroupError> {
    let root = dirname(&opts.folder);
    let base_depth = separator_count(&root);
    let substitute = opts.original_path().map(dirname).unwrap_or_default();

    let excludes = ExcludeFilter::new(opts.exclude.as_slice())?;
    let skip = opts.skip_levels + 1;

    let mut albums = GroupResult::new();

    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            opts.recursive
                || !entry.file_type().is_dir()
                || separator_count(walk_path(&root, &entry.path().to_string_lossy()))
                    <= base_depth + 1
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(utf8) = entry.path().to_str() else {
            warn!(path = %entry.path().display(), "skipping folder with a non UTF-8 name");
            continue;
        };
        let path = walk_path(&root, utf8).replacen(root.as_str(), &substitute, 1);

        if let Some(pattern) = excludes.matching(&path) {
            trace!(path, glob = pattern.glob(), "excluded");
            continue;
        }

        let segments: Vec<&str> = path.split(MAIN_SEPARATOR).collect();
        if segments.len() <= skip {
            continue;
        }

        let mut segments = &segments[skip..];
        if !opts.parent_group_assets {
            segments = &segments[segments.len() - 1..];
        }

        for segment in segments {
            let name = opts.album_name(segment);
            match albums.get_mut(name) {
                Some(folders) => folders.push(path.clone()),
                None => {
                    debug!(album = name, path, "new album group");
                    albums.insert(name.to_string(), vec![path.clone()]);
                    break;
                }
            }
        }
    }

    Ok(albums)
}

/// Entry path as a string. Children of `.` are reported without the `./`
/// prefix so they line up with the root string.
fn walk_path<'a>(root: &str, path: &'a str) -> &'a str {
    if root == "." {
        let dot_prefix = format!(".{MAIN_SEPARATOR}");
        if let Some(rest) = path.strip_prefix(&dot_prefix) {
            return rest;
        }
    }
    path
}

fn separator_count(path: &str) -> usize {
    path.matches(MAIN_SEPARATOR).count()
}

/// All but the last element of `path`, cleaned.
///
/// Unlike [`std::path::Path::parent`], a trailing separator counts as an empty
/// last element: `dirname("/photos/")` is `/photos`, not `/`.
pub fn dirname(path: &str) -> String {
    match path.rfind(MAIN_SEPARATOR) {
        Some(i) => clean(&path[..=i]),
        None => ".".to_string(),
    }
}

/// Lexically normalize a path: collapse repeated separators, drop `.`
/// elements, resolve `..` against preceding elements and strip any trailing
/// separator.
fn clean(path: &str) -> String {
    let absolute = path.starts_with(MAIN_SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(MAIN_SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join(&MAIN_SEPARATOR.to_string());
    match (absolute, joined.is_empty()) {
        (true, _) => format!("{MAIN_SEPARATOR}{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
