use std::path::PathBuf;

use backscroll::settings::SettingsStore;
use backscroll::{ClientResult, run};
use tracing_subscriber::EnvFilter;

/// Entry point.
///
/// Usage: `backscroll [settings.json]`. Without an argument the settings file in the
/// user config directory is used; `BACKSCROLL_*` variables override either.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ClientResult<()> {
    // Logs go to stderr so chat lines on stdout stay readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = match std::env::args_os().nth(1) {
        Some(path) => SettingsStore::new(PathBuf::from(path)),
        None => SettingsStore::load(),
    };
    let settings = store.settings();
    tracing::info!(
        path = ?store.config_path(),
        server = %settings.server_url,
        "settings loaded"
    );

    run(&settings).await
}
