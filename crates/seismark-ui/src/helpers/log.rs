// crates/seismark-ui/src/helpers/log.rs
//
// Subscriber setup for the binary.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch)
// there is no console attached, so stderr output is lost. Every event is also
// appended to a file in the OS temp directory.
//
// File: %TEMP%/seismark.log (append-only)
//
// Level filter: SEISMARK_LOG, else RUST_LOG, else `info`.
//   SEISMARK_LOG=seismark_media=debug seismark /data/run1

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context as _;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "SEISMARK_LOG";

pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("seismark.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A log file that cannot be opened only
/// disables the file layer.
pub fn init() -> anyhow::Result<()> {
    let path = log_file_path();
    let file = std::fs::OpenOptions::new().create(true).append(true).open(&path);

    let file_layer = file
        .as_ref()
        .ok()
        .and_then(|f| f.try_clone().ok())
        .map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f)));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("installing the tracing subscriber")?;

    if let Err(e) = file {
        tracing::warn!("[app] cannot open {}: {e}", path.display());
    }
    Ok(())
}
