use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreatePaste {
    pub content: String,
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
    #[serde(default)]
    pub max_views: Option<i64>,
}

#[derive(Serialize)]
pub struct PasteCreated {
    pub id: String,
    pub url: String,
}

#[derive(Serialize)]
pub struct PasteContent {
    pub content: String,
}

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: i64,
}
