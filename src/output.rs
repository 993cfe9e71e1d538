//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Album list
//!
//! ```text
//! ID                                    NAME       NUMBER OF ASSETS
//! 0d6cb8a5-8a3a-4c2e-9d1f-3c0f0d7f1a21  Food       12
//! 5f1e0e43-2b7b-4b5e-a3f7-0b6d2e9c8d10  Fruit      3
//! ```
//!
//! ## Server info
//!
//! ```text
//! Server:
//!   Version: v1.118.2
//!   ...
//! Storage:
//!   Size: 2TB
//!   Use: 500GB
//!   Available: 1.5TB
//! Stats:
//!   Photos: 1200
//!   Videos: 34
//!   Usage: 98GB
//! ```
//!
//! ## Auto-create summary
//!
//! ```text
//! Created 2 albums: Food, Fruit
//! Updated 1 album: Trips
//! Attached 48 assets
//! ```

use crate::albums::AutoCreateSummary;
use crate::info::ServerInfo;
use crate::remote::Album;
use humansize::{DECIMAL, FormatSizeOptions, format_size};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a byte count with decimal (1000-based) units and at most four
/// significant digits: `1234567` → `1.235MB`.
pub fn human_size(bytes: u64) -> String {
    let options = FormatSizeOptions::from(DECIMAL)
        .space_after_value(false)
        .decimal_zeroes(0)
        .decimal_places(decimal_places(bytes));
    format_size(bytes, options)
}

/// Places after the point that keep four significant digits once `bytes`
/// is scaled to its unit, with trailing zeros dropped.
fn decimal_places(bytes: u64) -> usize {
    let mut scaled = bytes as f64;
    while scaled >= 1000.0 {
        scaled /= 1000.0;
    }
    let integer_digits = if scaled < 1.0 {
        1
    } else {
        scaled.log10().floor() as usize + 1
    };
    let places = 4usize.saturating_sub(integer_digits);
    let text = format!("{scaled:.places$}");
    text.trim_end_matches('0')
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Album list
// ============================================================================

pub fn format_album_list(albums: &[Album]) -> Vec<String> {
    const HEADER: [&str; 3] = ["ID", "NAME", "NUMBER OF ASSETS"];

    let rows: Vec<[String; 3]> = albums
        .iter()
        .map(|a| [a.id.clone(), a.name.clone(), a.asset_count.to_string()])
        .collect();

    let id_width = rows.iter().map(|r| r[0].chars().count()).fold(HEADER[0].len(), usize::max);
    let name_width = rows.iter().map(|r| r[1].chars().count()).fold(HEADER[1].len(), usize::max);

    std::iter::once([HEADER[0].to_string(), HEADER[1].to_string(), HEADER[2].to_string()])
        .chain(rows)
        .map(|[id, name, count]| format!("{id:<id_width$}  {name:<name_width$}  {count}"))
        .collect()
}

pub fn print_album_list(albums: &[Album]) {
    for line in format_album_list(albums) {
        println!("{}", line);
    }
}

// ============================================================================
// Server info
// ============================================================================

pub fn format_server_info(info: &ServerInfo) -> Vec<String> {
    let about = &info.about;
    vec![
        "Server:".to_string(),
        format!("  Version: {}", about.version),
        format!("  Node.js: {}", about.nodejs),
        format!("  ImageMagick: {}", about.imagemagick),
        format!("  ExifTool: {}", about.exiftool),
        format!("  FFmpeg: {}", about.ffmpeg),
        format!("  Build: {}", about.build),
        "Storage:".to_string(),
        format!("  Size: {}", human_size(info.storage.size)),
        format!("  Use: {}", human_size(info.storage.used)),
        format!("  Available: {}", human_size(info.storage.available)),
        "Stats:".to_string(),
        format!("  Photos: {}", info.stats.photos),
        format!("  Videos: {}", info.stats.videos),
        format!("  Usage: {}", human_size(info.stats.usage)),
    ]
}

pub fn print_server_info(info: &ServerInfo) {
    for line in format_server_info(info) {
        println!("{}", line);
    }
}

// ============================================================================
// Auto-create summary
// ============================================================================

pub fn format_auto_create_summary(summary: &AutoCreateSummary) -> Vec<String> {
    if summary.is_empty() {
        return vec!["No folders matched, nothing to do".to_string()];
    }

    let mut lines = Vec::new();
    if !summary.created.is_empty() {
        lines.push(format!(
            "Created {}: {}",
            plural(summary.created.len(), "album"),
            summary.created.join(", ")
        ));
    }
    if !summary.reused.is_empty() {
        lines.push(format!(
            "Updated {}: {}",
            plural(summary.reused.len(), "album"),
            summary.reused.join(", ")
        ));
    }
    lines.push(format!("Attached {}", plural(summary.assets_attached, "asset")));
    lines
}

pub fn print_auto_create_summary(summary: &AutoCreateSummary) {
    for line in format_auto_create_summary(summary) {
        println!("{}", line);
    }
}
