use std::net::SocketAddr;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::controllers::paste;
use crate::error::ApiError;
use crate::html;
use crate::types::api::{CreatePaste, Health, PasteContent, PasteCreated};
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], app.config.port));
    let app = router(app);

    info!("listening on {addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

pub fn router(app: App) -> Router {
    let max_content_length = app.config.max_content_length;

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/pastes", post(create_paste))
        .route("/pastes/:id", get(get_paste_data))
        .route("/p/:id", get(get_paste_page))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_content_length))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "litebin",
        "endpoints": {
            "health": "/healthz",
            "create_paste": "POST /pastes",
            "get_paste": "GET /pastes/{id}",
            "view_paste": "GET /p/{id}",
        },
    }))
}

async fn healthz() -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now().timestamp_millis(),
    })
}

async fn create_paste(
    State(mut app): State<App>,
    Json(request): Json<CreatePaste>,
) -> crate::ApiResult<impl IntoResponse> {
    let paste = paste::create(
        &mut app,
        &request.content,
        request.ttl_seconds,
        request.max_views,
    )
    .await?;

    let url = format!("/p/{id}", id = paste.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, url.clone())],
        Json(PasteCreated { id: paste.id, url }),
    ))
}

async fn get_paste_data(
    State(mut app): State<App>,
    Path(id): Path<String>,
) -> crate::ApiResult<Json<PasteContent>> {
    let content = paste::fetch_for_read(&mut app, &id).await?;
    Ok(Json(PasteContent { content }))
}

async fn get_paste_page(
    State(mut app): State<App>,
    Path(id): Path<String>,
) -> crate::ApiResult<Response> {
    match paste::fetch_for_read(&mut app, &id).await {
        Ok(content) => Ok(Html(html::paste_page(&id, &content)).into_response()),
        Err(ApiError::NotFound) => {
            Ok((StatusCode::NOT_FOUND, Html(html::not_found_page())).into_response())
        }
        Err(error) => Err(error),
    }
}
