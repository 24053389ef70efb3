use chrono::Utc;
use eyre::{Result, eyre};
use log::{debug, info, warn};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::FetchConfig;
use crate::fallback::first_success;
use crate::format::{UNAVAILABLE, UNKNOWN_DATE, format_duration, format_published, format_view_count};
use crate::link::{ThumbnailQuality, thumbnail_url};

/// Descriptive metadata for a single video, formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub channel_title: String,
    pub description: String,
    pub view_count: String,
    pub published_at: String,
    pub duration: String,
    pub thumbnail_url: String,
    pub like_count: String,
}

impl VideoMetadata {
    /// Stand-in record used when no source answered
    pub fn placeholder(video_id: &str) -> Self {
        Self {
            title: format!("Educational Video {video_id}"),
            channel_title: "Educational Channel".to_string(),
            description: "Educational content".to_string(),
            view_count: UNAVAILABLE.to_string(),
            published_at: UNKNOWN_DATE.to_string(),
            duration: UNAVAILABLE.to_string(),
            thumbnail_url: thumbnail_url(video_id, ThumbnailQuality::MaxRes),
            like_count: UNAVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousVideo {
    title: String,
    author: Option<String>,
    description: Option<String>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    published: Option<i64>,
    length_seconds: Option<u64>,
}

impl InvidiousVideo {
    fn into_metadata(self, video_id: &str) -> VideoMetadata {
        let now = Utc::now();
        VideoMetadata {
            title: self.title,
            channel_title: self.author.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            view_count: self
                .view_count
                .map(format_view_count)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            published_at: self
                .published
                .map(|ts| format_published(ts, now))
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            duration: self
                .length_seconds
                .map(format_duration)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
            thumbnail_url: thumbnail_url(video_id, ThumbnailQuality::MaxRes),
            like_count: self
                .like_count
                .map(format_view_count)
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        }
    }
}

/// Build `{base}/api/v1/{kind}/{id}` with the id encoded as one path segment
pub(crate) fn api_url(base: &str, kind: &str, id: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| eyre!("source URL cannot be a base: {base}"))?
        .pop_if_empty()
        .extend(["api", "v1", kind, id]);
    Ok(url)
}

pub(crate) fn build_client(config: &FetchConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}

/// Looks up video metadata across an ordered list of mirrors
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl MetadataFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: build_client(&config),
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch metadata for a video. Never fails: when every source is down the
    /// placeholder record is returned instead.
    pub async fn fetch_metadata(&self, video_id: &str) -> VideoMetadata {
        let found = first_success(&self.config.sources, |source| {
            let source = source.to_string();
            async move { self.fetch_from(&source, video_id).await }
        })
        .await;

        match found {
            Some(metadata) => metadata,
            None => {
                warn!("All {} sources failed for video {video_id}, using placeholder", self.config.sources.len());
                VideoMetadata::placeholder(video_id)
            }
        }
    }

    async fn fetch_from(&self, source: &str, video_id: &str) -> Result<VideoMetadata> {
        let url = api_url(source, "videos", video_id)?;
        debug!("Fetching video metadata: {url}");

        let video: InvidiousVideo = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!("Fetched metadata for {video_id} from {source}");
        Ok(video.into_metadata(video_id))
    }
}
