use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tf_core::{CacheEntry, Config, Error, Result, ResultCache};

use crate::StorageBackend;

/// Local file-backed cache with the same `url`/`result`/`updated` layout as the DynamoDB table.
pub struct SqliteCache {
    pool: SqlitePool,
    table: String,
    db_path: PathBuf,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteCache {
    pub async fn new_with_path(db_path: &Path, table_name: &str) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        let table = quote_identifier(table_name);
        let migration = format!(
            "CREATE TABLE IF NOT EXISTS {} (url TEXT PRIMARY KEY, result TEXT, updated TEXT)",
            table
        );
        sqlx::query(&migration)
            .execute(&pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create table: {}", e)))?;

        Ok(Self {
            pool,
            table,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl StorageBackend for SqliteCache {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at TF_SQLITE_PATH"
    }

    async fn from_config(config: &Config) -> Result<Self> {
        Self::new_with_path(Path::new(&config.sqlite_path), &config.table_name).await
    }
}

#[async_trait]
impl ResultCache for SqliteCache {
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>> {
        let sql = format!("SELECT url, result, updated FROM {} WHERE url = ?", self.table);
        let row = sqlx::query(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to read cache entry: {}", e)))?;

        row.map(|row| {
            Ok(CacheEntry {
                url: row.try_get("url")?,
                result: row.try_get("result")?,
                updated: row.try_get("updated")?,
            })
        })
        .transpose()
        .map_err(|e: sqlx::Error| Error::Storage(format!("Malformed cache row: {}", e)))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (url, result, updated) VALUES (?, ?, ?)",
            self.table
        );
        sqlx::query(&sql)
            .bind(&entry.url)
            .bind(entry.result.as_deref())
            .bind(entry.updated.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to store cache entry: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_cache() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("cache.db");

        let cache = SqliteCache::new_with_path(&db_path, "analysis-results").await.unwrap();
        assert!(db_path.exists());
        assert!(cache.get("https://example.com/a").await.unwrap().is_none());

        let entry = CacheEntry::new("https://example.com/a", r#"{"success":true}"#, "2026-10-01T00:00:00+00:00");
        cache.put(&entry).await.unwrap();
        assert_eq!(cache.get("https://example.com/a").await.unwrap(), Some(entry));

        let newer = CacheEntry::new("https://example.com/a", r#"{"success":true}"#, "2026-10-09T00:00:00+00:00");
        cache.put(&newer).await.unwrap();
        assert_eq!(cache.get("https://example.com/a").await.unwrap(), Some(newer));
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("cache.db");
        let entry = CacheEntry::new("https://example.com/a", "{}", "2026-10-01T00:00:00+00:00");

        {
            let cache = SqliteCache::new_with_path(&db_path, "results").await.unwrap();
            cache.put(&entry).await.unwrap();
            cache.pool.close().await;
        }

        let reopened = SqliteCache::new_with_path(&db_path, "results").await.unwrap();
        assert_eq!(reopened.get("https://example.com/a").await.unwrap(), Some(entry));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("analysis-results"), "\"analysis-results\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
