use sqlx::FromRow;

/// A stored paste row. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, FromRow)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub max_views: Option<i64>,
    pub views: i64,
}
