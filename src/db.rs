use sqlx::AnyPool;

use crate::models::Paste;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS paste (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    created_at BIGINT NOT NULL,
    expires_at BIGINT,
    max_views BIGINT,
    views BIGINT NOT NULL DEFAULT 0
)";

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to a database by URL.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            pool: AnyPool::connect(url).await?,
        })
    }

    /// Create the paste table if it does not exist yet.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(SCHEMA).execute(&mut conn).await?;
        Ok(())
    }

    /// Get all pastes.
    pub async fn get_all_pastes(&mut self) -> crate::ApiResult<Vec<Paste>> {
        let mut conn = self.pool.acquire().await?;
        Ok(sqlx::query_as::<_, Paste>("SELECT * FROM paste")
            .fetch_all(&mut conn)
            .await?)
    }

    /// Get a paste by id.
    pub async fn get_paste(&mut self, id: &str) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, content, created_at, expires_at, max_views, views FROM paste WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Insert a paste with zero views. The primary key enforces id
    /// uniqueness across every row, expired or not.
    pub async fn insert_paste(
        &mut self,
        id: &str,
        content: &str,
        created_at: i64,
        expires_at: Option<i64>,
        max_views: Option<i64>,
    ) -> crate::ApiResult<Paste> {
        let mut conn = self.pool.acquire().await?;
        let paste = sqlx::query_as::<_, Paste>(
            "INSERT INTO paste (id, content, created_at, expires_at, max_views, views) VALUES \
             (?, ?, ?, ?, ?, 0) RETURNING id, content, created_at, expires_at, max_views, views",
        )
        .bind(id)
        .bind(content)
        .bind(created_at)
        .bind(expires_at)
        .bind(max_views)
        .fetch_one(&mut conn)
        .await?;
        Ok(paste)
    }

    /// Count one view and return the content, in a single conditional
    /// UPDATE. The row must exist, not be past its expiry, and still have
    /// view budget; otherwise no row matches, nothing is mutated, and `None`
    /// comes back. Running the check and the increment as one statement is
    /// what keeps concurrent readers from pushing `views` past `max_views`.
    pub async fn consume_view(&mut self, id: &str, now_ms: i64) -> crate::ApiResult<Option<String>> {
        let mut conn = self.pool.acquire().await?;
        let content = sqlx::query_scalar::<_, String>(
            "UPDATE paste SET views = views + 1 WHERE id = ? \
             AND (expires_at IS NULL OR expires_at >= ?) \
             AND (max_views IS NULL OR views < max_views) \
             RETURNING content",
        )
        .bind(id)
        .bind(now_ms)
        .fetch_optional(&mut conn)
        .await?;
        Ok(content)
    }
}

/// Whether a database error is a unique/primary key violation
/// (sqlite 1555/2067, postgres 23505).
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("1555" | "2067" | "23505"))
        }
        _ => false,
    }
}
