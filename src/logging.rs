//! Diagnostic logging to stderr.
//!
//! stdout carries command output (tables, summaries), so log events always go
//! to stderr. `RUST_LOG` takes precedence over the `-v` count.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count: none → warn, `-v` → info, `-vv` → debug,
/// `-vvv` and above → trace. Dependencies stay at warn below trace.
pub fn level_directive(verbosity: u8) -> String {
    let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
    match verbosity {
        0 => "warn".to_string(),
        1 => format!("warn,{crate_name}=info"),
        2 => format!("warn,{crate_name}=debug"),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbosity)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
