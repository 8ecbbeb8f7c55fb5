//! Test utilities for database tests.
//!
//! Every test gets its own database file inside a `TempDir`, opened through
//! the same code path the server uses so pragmas and migrations match
//! production.

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::DBService;

/// Create a fresh database with migrations applied.
///
/// The returned `TempDir` must outlive the pool.
pub async fn create_test_db() -> (DBService, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create test temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = DBService::open(&db_path)
        .await
        .expect("Failed to open test database");
    (db, temp_dir)
}

/// Convenience wrapper returning just the pool.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let (db, temp_dir) = create_test_db().await;
    (db.pool, temp_dir)
}
