//! Stamps build provenance into the binary for `immich-tools --version`.
//!
//! - `GIT_HASH`: short commit, empty outside a git checkout
//! - `ON_RELEASE_TAG`: `true` when HEAD is exactly a tag
//! - `BUILD_TARGET`: target triple the binary was compiled for

use std::process::Command;

/// Stdout of a successful `git` invocation, trimmed.
fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_owned())
}

fn main() {
    for watched in [".git/HEAD", ".git/refs/"] {
        println!("cargo:rerun-if-changed={watched}");
    }
    println!("cargo:rerun-if-env-changed=TARGET");

    let stamps = [
        ("GIT_HASH", git(&["rev-parse", "--short", "HEAD"]).unwrap_or_default()),
        (
            "ON_RELEASE_TAG",
            git(&["describe", "--exact-match", "--tags", "HEAD"])
                .is_some()
                .to_string(),
        ),
        ("BUILD_TARGET", std::env::var("TARGET").unwrap_or_default()),
    ];
    for (key, value) in stamps {
        println!("cargo:rustc-env={key}={value}");
    }
}
