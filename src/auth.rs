//! Stored credentials for the Immich server.
//!
//! `login` writes `{host, key}` as JSON to `~/.config/immich-tools/auth.json`
//! (or the file given with `--config`), `logout` removes it and every other
//! command reads it back with [`session`]. On unix the config directory is
//! created with mode 0700 and the file with mode 0600, since it holds an API
//! key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("unable to locate the home directory")]
    NoHome,
    #[error("failed to create config folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write credentials file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to open config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to remove credentials file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub key: String,
}

pub fn default_credentials_path() -> Result<PathBuf, AuthError> {
    let home = dirs::home_dir().ok_or(AuthError::NoHome)?;
    Ok(home.join(".config").join("immich-tools").join("auth.json"))
}

fn resolve(path: Option<&Path>) -> Result<PathBuf, AuthError> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_credentials_path(),
    }
}

/// Store `credentials`, replacing any previous login. Returns the file path.
pub fn login(credentials: &Credentials, path: Option<&Path>) -> Result<PathBuf, AuthError> {
    let path = resolve(path)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_private_dir(dir).map_err(|source| AuthError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut json = serde_json::to_string(credentials).map_err(|source| AuthError::Parse {
        path: path.clone(),
        source,
    })?;
    json.push('\n');

    write_private_file(&path, json.as_bytes()).map_err(|source| AuthError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Remove stored credentials. Returns the removed file path.
pub fn logout(path: Option<&Path>) -> Result<PathBuf, AuthError> {
    let path = resolve(path)?;
    fs::remove_file(&path).map_err(|source| AuthError::Remove {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Read stored credentials.
pub fn session(path: Option<&Path>) -> Result<Credentials, AuthError> {
    let path = resolve(path)?;
    let content = fs::read_to_string(&path).map_err(|source| AuthError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| AuthError::Parse { path, source })
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn creds() -> Credentials {
        Credentials {
            host: "http://immich.local:2283".into(),
            key: "secret".into(),
        }
    }

    #[test]
    fn login_then_session_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/auth.json");

        let written = login(&creds(), Some(&path)).unwrap();
        assert_eq!(written, path);
        assert_eq!(session(Some(&path)).unwrap(), creds());
    }

    #[test]
    fn login_overwrites_previous_credentials() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");

        let old = Credentials {
            host: "http://a-much-longer-old-host.example:2283".into(),
            key: "old".into(),
        };
        login(&old, Some(&path)).unwrap();
        login(&creds(), Some(&path)).unwrap();
        assert_eq!(session(Some(&path)).unwrap(), creds());
    }

    #[test]
    fn file_uses_host_and_key_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        login(&creds(), Some(&path)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["host"], "http://immich.local:2283");
        assert_eq!(value["key"], "secret");
    }

    #[cfg(unix)]
    #[test]
    fn credentials_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("immich-tools");
        let path = dir.join("auth.json");
        login(&creds(), Some(&path)).unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode & 0o077, 0);
        assert_eq!(dir_mode & 0o077, 0);
    }

    #[test]
    fn logout_removes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        login(&creds(), Some(&path)).unwrap();

        logout(Some(&path)).unwrap();
        assert!(!path.exists());
        assert!(matches!(session(Some(&path)), Err(AuthError::Read { .. })));
    }

    #[test]
    fn logout_without_login_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        assert!(matches!(logout(Some(&path)), Err(AuthError::Remove { .. })));
    }

    #[test]
    fn missing_session_names_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        let err = session(Some(&path)).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn corrupt_session_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(session(Some(&path)), Err(AuthError::Parse { .. })));
    }

    #[test]
    fn default_path_is_under_config_dir() {
        if let Ok(path) = default_credentials_path() {
            assert!(path.ends_with(".config/immich-tools/auth.json"));
        }
    }
}
