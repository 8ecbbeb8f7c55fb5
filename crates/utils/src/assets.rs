use std::path::PathBuf;

use directories::ProjectDirs;

use crate::path::expand_tilde;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Root directory for runtime data (database, uploads, logs).
///
/// `FOLIO_ASSET_DIR` wins when set. Otherwise debug builds use
/// `<workspace>/dev_assets` and release builds the platform data dir.
pub fn asset_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FOLIO_ASSET_DIR") {
        return expand_tilde(&path);
    }

    if cfg!(debug_assertions) {
        PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("com", "nhungconsultancy", "folio")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"))
    }
}

/// Get the database file path.
///
/// Respects `FOLIO_DATABASE_PATH`. Default: `{asset_dir}/db.sqlite`
pub fn database_path() -> PathBuf {
    if let Ok(path) = std::env::var("FOLIO_DATABASE_PATH") {
        return expand_tilde(&path);
    }
    asset_dir().join("db.sqlite")
}

/// Directory admin uploads are written to and served from.
///
/// Respects `FOLIO_UPLOAD_DIR`. Default: `{asset_dir}/uploads`
pub fn upload_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FOLIO_UPLOAD_DIR") {
        return expand_tilde(&path);
    }
    asset_dir().join("uploads")
}

/// Directory holding the built public site (SPA bundle).
///
/// Respects `FOLIO_STATIC_DIR`. Default: `<workspace>/frontend/dist`
pub fn static_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FOLIO_STATIC_DIR") {
        return expand_tilde(&path);
    }
    PathBuf::from(PROJECT_ROOT).join("../../frontend/dist")
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_database_path_default() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe {
            env::remove_var("FOLIO_DATABASE_PATH");
            env::remove_var("FOLIO_ASSET_DIR");
        }
        assert!(database_path().ends_with("db.sqlite"));
    }

    #[test]
    #[serial]
    fn test_database_path_env_override() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe { env::set_var("FOLIO_DATABASE_PATH", "/custom/path/site.db") };
        let path = database_path();
        unsafe { env::remove_var("FOLIO_DATABASE_PATH") };
        assert_eq!(path, PathBuf::from("/custom/path/site.db"));
    }

    #[test]
    #[serial]
    fn test_upload_dir_follows_asset_dir() {
        let temp = tempfile::tempdir().unwrap();
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe {
            env::remove_var("FOLIO_UPLOAD_DIR");
            env::set_var("FOLIO_ASSET_DIR", temp.path());
        }
        let dir = upload_dir();
        unsafe { env::remove_var("FOLIO_ASSET_DIR") };
        assert_eq!(dir, temp.path().join("uploads"));
    }

    #[test]
    #[serial]
    fn test_upload_dir_tilde_expansion() {
        // SAFETY: Tests run serially via #[serial] attribute
        unsafe { env::set_var("FOLIO_UPLOAD_DIR", "~/folio-uploads") };
        let dir = upload_dir();
        unsafe { env::remove_var("FOLIO_UPLOAD_DIR") };
        if dirs::home_dir().is_some() {
            assert!(!dir.to_string_lossy().starts_with('~'));
        }
    }
}
