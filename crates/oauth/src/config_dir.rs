use std::path::PathBuf;

/// Base config directory: `~/.config/lattice`, or `$LATTICE_CONFIG_DIR`
/// when set (used by tests and packaged installs).
pub(crate) fn lattice_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("LATTICE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("lattice"))
        .unwrap_or_else(|| PathBuf::from(".lattice"))
}
