//! SQLite-backed review store

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};
use crate::models::{NewReview, ProductFilter, ProductId, Review, ReviewId, ReviewMessage};
use crate::traits::ReviewStore;

const REVIEW_COLUMNS: &str =
    "id, product_id, message, author, likes_count, created_at, updated_at";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Default database location (`~/.cache/kudos/kudos.db`)
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kudos")
            .join("kudos.db")
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    product_id: i64,
    message: String,
    author: String,
    likes_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            message: row.message,
            author: row.author,
            // the schema CHECK keeps this non-negative
            likes_count: u64::try_from(row.likes_count).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// [`ReviewStore`] persisted in a SQLite file through a connection pool.
///
/// Every value is bound as a parameter. Likes are applied with a single
/// `UPDATE ... SET likes_count = likes_count + 1` so SQLite serializes
/// concurrent increments.
#[derive(Clone)]
pub struct SqliteReviewStore {
    pool: SqlitePool,
}

impl SqliteReviewStore {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(path = %config.path.display(), "Connected to review database");
        Ok(Self { pool })
    }

    /// Connect and bring the schema up to date
    pub async fn open(config: DatabaseConfig) -> Result<Self> {
        let store = Self::connect(config).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let migration_sql = include_str!("../migrations/001_initial_schema.sql");

        sqlx::raw_sql(migration_sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    #[instrument(skip(self))]
    async fn list_by_product(&self, filter: &ProductFilter) -> Result<Vec<Review>> {
        let Some(product_id) = filter.product() else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = ? ORDER BY id ASC"
        ))
        .bind(product_id.get())
        .fetch_all(&self.pool)
        .await?;

        debug!(product = %product_id, count = rows.len(), "Listed reviews");
        Ok(rows.into_iter().map(Review::from).collect())
    }

    #[instrument(skip_all, fields(product = %review.product_id))]
    async fn create(&self, review: NewReview) -> Result<Review> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r#"
            INSERT INTO reviews (product_id, message, author, likes_count, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(review.product_id.get())
        .bind(review.message.as_str())
        .bind(&review.author)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Review> {
        sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(Review::from)
        .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self, message))]
    async fn update_message(&self, id: ReviewId, message: ReviewMessage) -> Result<Review> {
        sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET message = ?, updated_at = ? WHERE id = ? RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(message.as_str())
        .bind(Utc::now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(Review::from)
        .ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn increment_likes(&self, id: ReviewId) -> Result<Review> {
        sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET likes_count = likes_count + 1, updated_at = ? WHERE id = ? RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(Review::from)
        .ok_or(StoreError::NotFound(id))
    }

    async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
