//! Auto-create options and batch config files.
//!
//! The `album auto-create` command takes its options either from CLI flags or
//! from a config file passed with `--from-config`. Both paths produce the same
//! [`AutoCreateOptions`], which is immutable for the duration of a run.
//!
//! ## Config File
//!
//! JSON is the primary format. Files ending in `.toml` are read as TOML:
//!
//! ```json
//! {
//!   "folder": "/mnt/photos/",
//!   "recursive": true,
//!   "skip_levels": 1,
//!   "original_path": "/usr/src/app/upload/library/",
//!   "exclude": ["/tmp*", "*.{bak,old}"],
//!   "parent_group_assets": false,
//!   "albums": { "2023-japan": "Japan 2023" }
//! }
//! ```
//!
//! All keys are optional except `folder`. Unknown keys are rejected to catch
//! typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read auto create albums config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{name} '{pair}' must be formatted as key=value")]
    InvalidPair { name: &'static str, pair: String },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Options for one auto-create run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoCreateOptions {
    /// Root path to scan. The walk starts at its parent directory, so pass a
    /// trailing separator (`/photos/`) to scan the directory itself.
    pub folder: String,
    /// Descend below the first level of folders.
    pub recursive: bool,
    /// Leading path segments (after the root) ignored when naming albums.
    pub skip_levels: usize,
    /// Path prefix of the library as the server sees it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    /// Glob patterns of folders whose assets are not added to any album.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Use every remaining segment as an album key, not only the last one.
    pub parent_group_assets: bool,
    /// Rename map from folder segment to album name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub albums: BTreeMap<String, String>,
    /// Cap on concurrent asset lookups. Absent means one lookup per folder
    /// with no cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_lookups: Option<usize>,
}

impl AutoCreateOptions {
    /// The original path, treating an empty string as unset.
    pub fn original_path(&self) -> Option<&str> {
        self.original_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Album name for a folder segment after applying the rename map.
    pub fn album_name<'a>(&'a self, segment: &'a str) -> &'a str {
        self.albums.get(segment).map(String::as_str).unwrap_or(segment)
    }

    /// Options for a run started from the command line.
    ///
    /// A `from_config` file replaces the flags entirely, renames included.
    /// Otherwise `renames` become the rename map and the result is validated.
    pub fn from_flags<S: AsRef<str>>(
        flags: AutoCreateOptions,
        renames: &[S],
        from_config: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = from_config {
            return load_options(path);
        }

        let opts = Self {
            albums: parse_renames(renames)?,
            ..flags
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folder.is_empty() {
            return Err(ConfigError::Validation(
                "empty path is not allowed".into(),
            ));
        }
        if self.max_concurrent_lookups == Some(0) {
            return Err(ConfigError::Validation(
                "max_concurrent_lookups must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load and validate options from a batch config file.
///
/// `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_options(path: &Path) -> Result<AutoCreateOptions, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let options: AutoCreateOptions = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    options.validate()?;
    Ok(options)
}

/// Parse `key=value` rename pairs from the command line.
///
/// Only the first `=` splits, so album names may contain `=`. A later pair
/// with the same key wins.
pub fn parse_renames<S: AsRef<str>>(pairs: &[S]) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut renames = BTreeMap::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidPair {
                name: "rename",
                pair: pair.to_string(),
            });
        };
        renames.insert(key.to_string(), value.to_string());
    }
    Ok(renames)
}

/// Returns a fully-commented example config in TOML.
///
/// Used by the `album gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Auto-create albums configuration
# =================================
# Pass this file with `album auto-create --from-config <file>`.
# The same keys are accepted in a .json file.
# Unknown keys will cause an error.

# Folder to scan. The walk starts at the parent of this path, so keep the
# trailing slash to scan the folder itself.
folder = "/mnt/photos/"

# Descend into every sub-folder instead of only the first level.
recursive = false

# Leading path segments below the root that never become album names.
skip_levels = 0

# Where the server stores the same library. Local paths are rewritten to
# this prefix before matching and grouping.
# original_path = "/usr/src/app/upload/library/"

# Glob patterns of folders to leave out. Sub-folders of an excluded folder
# are still considered on their own.
#   *        any run of characters (only one in a row)
#   ?        one character
#   [a-z]    character class
#   {a,b}    alternation
#   {{re}}   raw regular expression
exclude = []

# Use every remaining path segment as an album key, not only the folder name.
parent_group_assets = false

# Maximum number of concurrent asset lookups per album. Omit for no cap.
# max_concurrent_lookups = 8

# Rename folder names to album names.
[albums]
# "2023-japan" = "Japan 2023"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_json_config() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "albums.json",
            r#"{
                "folder": "/mnt/photos/",
                "recursive": true,
                "skip_levels": 2,
                "original_path": "/library/",
                "exclude": ["/nope*"],
                "parent_group_assets": true,
                "albums": {"food": "Food"}
            }"#,
        );

        let opts = load_options(&path).unwrap();
        assert_eq!(opts.folder, "/mnt/photos/");
        assert!(opts.recursive);
        assert_eq!(opts.skip_levels, 2);
        assert_eq!(opts.original_path(), Some("/library/"));
        assert_eq!(opts.exclude, vec!["/nope*"]);
        assert!(opts.parent_group_assets);
        assert_eq!(opts.album_name("food"), "Food");
        assert_eq!(opts.max_concurrent_lookups, None);
    }

    #[test]
    fn load_toml_config() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "albums.toml",
            r#"
folder = "/mnt/photos/"
skip_levels = 1
max_concurrent_lookups = 4

[albums]
fruit = "Fruit"
"#,
        );

        let opts = load_options(&path).unwrap();
        assert_eq!(opts.skip_levels, 1);
        assert_eq!(opts.max_concurrent_lookups, Some(4));
        assert_eq!(opts.album_name("fruit"), "Fruit");
        assert!(!opts.recursive);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "albums.json", r#"{"folder": "/p/"}"#);

        let opts = load_options(&path).unwrap();
        assert_eq!(
            opts,
            AutoCreateOptions {
                folder: "/p/".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "albums.json", r#"{"folder": "/p/", "recursve": true}"#);
        assert!(matches!(load_options(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn empty_folder_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "albums.json", r#"{"recursive": true}"#);
        let err = load_options(&path).unwrap_err();
        assert!(err.to_string().contains("empty path is not allowed"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let opts = AutoCreateOptions {
            folder: "/p/".into(),
            max_concurrent_lookups: Some(0),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_options(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn empty_original_path_is_unset() {
        let opts = AutoCreateOptions {
            original_path: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(opts.original_path(), None);
    }

    #[test]
    fn album_name_without_rename_is_segment() {
        let opts = AutoCreateOptions::default();
        assert_eq!(opts.album_name("trip"), "trip");
    }

    // =========================================================================
    // Rename pairs
    // =========================================================================

    #[test]
    fn rename_pairs_parsed() {
        let renames = parse_renames(&["food=Food", "a=b=c"]).unwrap();
        assert_eq!(renames.get("food").map(String::as_str), Some("Food"));
        assert_eq!(renames.get("a").map(String::as_str), Some("b=c"));
    }

    #[test]
    fn rename_pair_without_equals_rejected() {
        let err = parse_renames(&["food"]).unwrap_err();
        assert_eq!(err.to_string(), "rename 'food' must be formatted as key=value");
    }

    #[test]
    fn no_rename_pairs_is_empty_map() {
        assert!(parse_renames::<&str>(&[]).unwrap().is_empty());
    }

    // =========================================================================
    // Command-line flags
    // =========================================================================

    fn flags() -> AutoCreateOptions {
        AutoCreateOptions {
            folder: "/mnt/photos/".into(),
            recursive: true,
            skip_levels: 1,
            ..Default::default()
        }
    }

    #[test]
    fn from_config_replaces_flags() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "albums.json", r#"{"folder": "/p/"}"#);

        // The malformed rename is never parsed.
        let opts =
            AutoCreateOptions::from_flags(flags(), &["food"], Some(path.as_path())).unwrap();
        assert_eq!(
            opts,
            AutoCreateOptions {
                folder: "/p/".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn from_config_errors_surface() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "albums.json", r#"{"recursive": true}"#);
        let err = AutoCreateOptions::from_flags::<&str>(flags(), &[], Some(path.as_path()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn flags_take_renames() {
        let opts =
            AutoCreateOptions::from_flags(flags(), &["food=Food", "food=Dinner"], None).unwrap();
        assert_eq!(opts.folder, "/mnt/photos/");
        assert!(opts.recursive);
        assert_eq!(opts.skip_levels, 1);
        assert_eq!(opts.album_name("food"), "Dinner");
    }

    #[test]
    fn flags_with_bad_rename_rejected() {
        let err = AutoCreateOptions::from_flags(flags(), &["food"], None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPair { name: "rename", .. }));
    }

    #[test]
    fn flags_without_folder_rejected() {
        let no_folder = AutoCreateOptions {
            folder: String::new(),
            ..flags()
        };
        let err = AutoCreateOptions::from_flags::<&str>(no_folder, &[], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Config validation error: empty path is not allowed"
        );
    }

    #[test]
    fn flags_with_zero_concurrency_rejected() {
        let zero = AutoCreateOptions {
            max_concurrent_lookups: Some(0),
            ..flags()
        };
        let err = AutoCreateOptions::from_flags::<&str>(zero, &[], None).unwrap_err();
        assert!(err.to_string().contains("max_concurrent_lookups"));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_parses_and_validates() {
        let opts: AutoCreateOptions = toml::from_str(stock_config_toml()).unwrap();
        opts.validate().unwrap();
        assert_eq!(opts.folder, "/mnt/photos/");
        assert!(opts.albums.is_empty());
        assert!(opts.exclude.is_empty());
    }
}
