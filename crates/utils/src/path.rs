use std::path::PathBuf;

/// Expand a leading `~` or `~/` to the current user's home directory.
///
/// Paths without a tilde prefix, and systems without a home directory, are
/// returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
