use chrono::Utc;
use tracing::info;

use crate::db::is_unique_violation;
use crate::error::ApiError;
use crate::id::generate_id;
use crate::models::Paste;
use crate::App;

/// How many times to regenerate on an id collision before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

/// Create a new paste and return the stored record.
///
/// Validation runs before anything touches storage. Id uniqueness is
/// enforced by the primary key: a colliding insert is retried with a fresh
/// id, so two concurrent creates can never both commit the same one.
pub async fn create(
    app: &mut App,
    content: &str,
    ttl_seconds: Option<i64>,
    max_views: Option<i64>,
) -> crate::ApiResult<Paste> {
    if content.trim().is_empty() {
        return Err(ApiError::EmptyContent);
    }
    if ttl_seconds.is_some_and(|ttl| ttl <= 0) {
        return Err(ApiError::InvalidTtl);
    }
    if max_views.is_some_and(|views| views <= 0) {
        return Err(ApiError::InvalidMaxViews);
    }

    let created_at = Utc::now().timestamp_millis();
    let expires_at = match ttl_seconds {
        // a ttl too large for i64 millisecond arithmetic is as invalid as a
        // non-positive one
        Some(ttl) => Some(
            ttl.checked_mul(1000)
                .and_then(|ms| created_at.checked_add(ms))
                .ok_or(ApiError::InvalidTtl)?,
        ),
        None => None,
    };

    for _ in 0..MAX_ID_ATTEMPTS {
        let id = generate_id();
        match app
            .database
            .insert_paste(&id, content, created_at, expires_at, max_views)
            .await
        {
            Ok(paste) => {
                info!("new paste: id='{id}', size={size}", size = content.len());
                return Ok(paste);
            }
            Err(ApiError::Database { source }) if is_unique_violation(&source) => continue,
            Err(error) => return Err(error),
        }
    }

    Err(ApiError::IdsExhausted)
}

/// Fetch a paste's content for a read, counting the view.
///
/// Accessibility is evaluated against the wall clock at call time, inside
/// the same storage operation that increments the counter. Missing,
/// time-expired, and view-exhausted pastes all come back as `NotFound`.
pub async fn fetch_for_read(app: &mut App, id: &str) -> crate::ApiResult<String> {
    let now = Utc::now().timestamp_millis();
    app.database
        .consume_view(id, now)
        .await?
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;
    use crate::db::Database;

    async fn test_app() -> (App, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let database_url = format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("pastes.db").display()
        );
        let database = Database::connect(&database_url).await.unwrap();
        database.migrate().await.unwrap();
        let config = Config {
            port: 0,
            database_url,
            max_content_length: 1024 * 1024,
        };
        (App { config, database }, temp_dir)
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let (mut app, _temp) = test_app().await;

        let paste = create(&mut app, "hello world", None, None).await.unwrap();
        assert_eq!(paste.views, 0);
        assert!(paste.expires_at.is_none());

        let content = fetch_for_read(&mut app, &paste.id).await.unwrap();
        assert_eq!(content, "hello world");
        assert_eq!(app.database.get_paste(&paste.id).await.unwrap().views, 1);
    }

    #[tokio::test]
    async fn blank_content_fails_and_persists_nothing() {
        let (mut app, _temp) = test_app().await;

        for content in ["", "   ", "\n\t  \n"] {
            let result = create(&mut app, content, None, None).await;
            assert!(matches!(result, Err(ApiError::EmptyContent)));
        }

        assert!(app.database.get_all_pastes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_positive_limits_are_rejected() {
        let (mut app, _temp) = test_app().await;

        assert!(matches!(
            create(&mut app, "x", Some(0), None).await,
            Err(ApiError::InvalidTtl)
        ));
        assert!(matches!(
            create(&mut app, "x", None, Some(-1)).await,
            Err(ApiError::InvalidMaxViews)
        ));
        assert!(app.database.get_all_pastes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overflowing_ttl_is_rejected_and_persists_nothing() {
        let (mut app, _temp) = test_app().await;

        for ttl in [i64::MAX, i64::MAX / 1000] {
            let result = create(&mut app, "x", Some(ttl), None).await;
            assert!(matches!(result, Err(ApiError::InvalidTtl)));
        }
        assert!(app.database.get_all_pastes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ttl_derives_expiry_from_creation_time() {
        let (mut app, _temp) = test_app().await;

        let paste = create(&mut app, "timed", Some(60), None).await.unwrap();
        assert_eq!(paste.expires_at, Some(paste.created_at + 60_000));
    }

    #[tokio::test]
    async fn view_limit_allows_exactly_n_sequential_reads() {
        let (mut app, _temp) = test_app().await;

        let paste = create(&mut app, "x", None, Some(2)).await.unwrap();

        assert_eq!(fetch_for_read(&mut app, &paste.id).await.unwrap(), "x");
        assert_eq!(fetch_for_read(&mut app, &paste.id).await.unwrap(), "x");
        assert!(matches!(
            fetch_for_read(&mut app, &paste.id).await,
            Err(ApiError::NotFound)
        ));

        // the failed read must not have counted
        assert_eq!(app.database.get_paste(&paste.id).await.unwrap().views, 2);
    }

    #[tokio::test]
    async fn expired_paste_is_not_found_and_not_counted() {
        let (mut app, _temp) = test_app().await;

        // row whose expiry is already in the past, plenty of view budget left
        let now = Utc::now().timestamp_millis();
        app.database
            .insert_paste("deadbeef", "gone", now - 10_000, Some(now - 5_000), Some(100))
            .await
            .unwrap();

        assert!(matches!(
            fetch_for_read(&mut app, "deadbeef").await,
            Err(ApiError::NotFound)
        ));
        assert_eq!(app.database.get_paste("deadbeef").await.unwrap().views, 0);
    }

    #[tokio::test]
    async fn ttl_expiry_kicks_in_after_the_deadline() {
        let (mut app, _temp) = test_app().await;

        let paste = create(&mut app, "hello", Some(1), None).await.unwrap();
        assert_eq!(fetch_for_read(&mut app, &paste.id).await.unwrap(), "hello");

        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert!(matches!(
            fetch_for_read(&mut app, &paste.id).await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (mut app, _temp) = test_app().await;

        assert!(matches!(
            fetch_for_read(&mut app, "no-such-id").await,
            Err(ApiError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rapid_creation_yields_distinct_ids() {
        let (mut app, _temp) = test_app().await;

        let mut ids = HashSet::new();
        for _ in 0..200 {
            let paste = create(&mut app, "content", None, None).await.unwrap();
            ids.insert(paste.id);
        }
        assert_eq!(ids.len(), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_never_overshoot_the_view_limit() {
        let (mut app, _temp) = test_app().await;

        let paste = create(&mut app, "contended", None, Some(3)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let mut app = app.clone();
            let id = paste.id.clone();
            handles.push(tokio::spawn(
                async move { fetch_for_read(&mut app, &id).await },
            ));
        }

        let mut successes = 0;
        let mut not_found = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(content) => {
                    assert_eq!(content, "contended");
                    successes += 1;
                }
                Err(ApiError::NotFound) => not_found += 1,
                Err(error) => panic!("unexpected error: {error:?}"),
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(not_found, 5);
        assert_eq!(app.database.get_paste(&paste.id).await.unwrap().views, 3);
    }
}
