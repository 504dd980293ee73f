use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Pillbox";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Pillbox/ on all platforms (user-visible, not hidden)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Pillbox")
}

/// Path of the SQLite database file
pub fn db_path() -> PathBuf {
    app_data_dir().join("pillbox.db")
}

/// Directory with the static web client, served when it exists.
/// Overridable via PILLBOX_WEB_DIR.
pub fn web_dir() -> PathBuf {
    std::env::var("PILLBOX_WEB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("web"))
}

/// Listen address, overridable via PILLBOX_ADDR.
///
/// Defaults to loopback:3000 — the port the original web client expects.
pub fn bind_addr() -> SocketAddr {
    std::env::var("PILLBOX_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "pillbox=info,tower_http=warn"
}
