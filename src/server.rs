use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::chat::{ChatClient, ChatMessage};
use crate::error::{ApiError, ApiResult};
use crate::link::{self, IdentifierPair};
use crate::metadata::{MetadataFetcher, VideoMetadata};
use crate::playlist::{Playlist, PlaylistFetcher};

/// Shared handles for request handlers
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<MetadataFetcher>,
    pub playlists: Arc<PlaylistFetcher>,
    pub chat: Arc<ChatClient>,
}

impl AppState {
    pub fn new(metadata: MetadataFetcher, playlists: PlaylistFetcher, chat: ChatClient) -> Self {
        Self {
            metadata: Arc::new(metadata),
            playlists: Arc::new(playlists),
            chat: Arc::new(chat),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistQuery {
    playlist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(flatten)]
    ids: IdentifierPair,
    watch_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

fn required(value: Option<String>, msg: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(msg))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn video(State(state): State<AppState>, Query(query): Query<VideoQuery>) -> ApiResult<Json<VideoMetadata>> {
    let video_id = required(query.video_id, "Video ID is required")?;
    debug!("GET video {video_id}");
    Ok(Json(state.metadata.fetch_metadata(&video_id).await))
}

async fn playlist(State(state): State<AppState>, Query(query): Query<PlaylistQuery>) -> ApiResult<Json<Playlist>> {
    let playlist_id = required(query.playlist_id, "Missing playlistId")?;
    debug!("GET playlist {playlist_id}");
    Ok(Json(state.playlists.fetch_playlist(&playlist_id).await))
}

async fn extract(Query(query): Query<ExtractQuery>) -> ApiResult<Json<ExtractResponse>> {
    const INVALID: &str = "Please enter a valid YouTube URL";
    let url = required(query.url, INVALID)?;
    let ids = link::extract(&url);
    let watch_url = ids.watch_path().ok_or_else(|| ApiError::bad_request(INVALID))?;
    Ok(Json(ExtractResponse { ids, watch_url }))
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> ApiResult<Json<ChatMessage>> {
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("At least one message is required"));
    }
    let reply = state.chat.reply(&request.messages).await.map_err(ApiError::upstream)?;
    Ok(Json(reply))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/youtube/video", get(video))
        .route("/api/youtube/playlist", get(playlist))
        .route("/api/extract", get(extract))
        .route("/api/chat", post(chat))
        .with_state(state)
        .layer(cors)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
