use eyre::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::FetchConfig;
use crate::fallback::first_success;
use crate::format::format_duration;
use crate::link::{ThumbnailQuality, thumbnail_url};
use crate::metadata::{api_url, build_client};

const PLACEHOLDER_VIDEOS: [(&str, &str); 5] = [
    ("dQw4w9WgXcQ", "Introduction to the Topic"),
    ("jNQXAC9IVRw", "Basic Concepts"),
    ("y6120QOlsfU", "Advanced Applications"),
    ("kJQP7kiw5Fk", "Practical Examples"),
    ("lp-EO5I60KA", "Summary and Review"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub thumbnail: String,
    /// 1-based position in the playlist
    pub index: usize,
    pub channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub title: String,
    pub description: String,
    pub videos: Vec<PlaylistVideo>,
}

impl Playlist {
    /// Generic course outline shown when the real playlist is unavailable
    pub fn placeholder() -> Self {
        Self {
            title: "Educational Course Playlist".to_string(),
            description: "A structured learning playlist".to_string(),
            videos: PLACEHOLDER_VIDEOS
                .iter()
                .enumerate()
                .map(|(i, (id, title))| PlaylistVideo {
                    id: id.to_string(),
                    title: title.to_string(),
                    duration: "10:00".to_string(),
                    thumbnail: thumbnail_url(id, ThumbnailQuality::Medium),
                    index: i + 1,
                    channel_title: "Educational Channel".to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvidiousPlaylist {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    videos: Vec<InvidiousPlaylistVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousPlaylistVideo {
    video_id: String,
    title: String,
    author: Option<String>,
    length_seconds: Option<u64>,
    #[serde(default)]
    video_thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl InvidiousPlaylist {
    fn into_playlist(self, limit: usize) -> Playlist {
        let videos = self
            .videos
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, v)| PlaylistVideo {
                thumbnail: v
                    .video_thumbnails
                    .into_iter()
                    .next()
                    .map(|t| t.url)
                    .unwrap_or_else(|| thumbnail_url(&v.video_id, ThumbnailQuality::Medium)),
                duration: format_duration(v.length_seconds.unwrap_or(0)),
                channel_title: v.author.unwrap_or_else(|| "YouTube Channel".to_string()),
                id: v.video_id,
                title: v.title,
                index: i + 1,
            })
            .collect();

        Playlist {
            title: self
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled Playlist".to_string()),
            description: self.description.unwrap_or_default(),
            videos,
        }
    }
}

/// Looks up playlist contents across an ordered list of mirrors
#[derive(Debug, Clone)]
pub struct PlaylistFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl PlaylistFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: build_client(&config),
            config,
        }
    }

    /// Fetch a playlist, falling back to the placeholder outline when every
    /// source fails
    pub async fn fetch_playlist(&self, playlist_id: &str) -> Playlist {
        let found = first_success(&self.config.sources, |source| {
            let source = source.to_string();
            async move { self.fetch_from(&source, playlist_id).await }
        })
        .await;

        found.unwrap_or_else(|| {
            warn!("All sources failed for playlist {playlist_id}, using placeholder");
            Playlist::placeholder()
        })
    }

    async fn fetch_from(&self, source: &str, playlist_id: &str) -> Result<Playlist> {
        let url = api_url(source, "playlists", playlist_id)?;
        debug!("Fetching playlist: {url}");

        let playlist: InvidiousPlaylist = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!("Fetched playlist {playlist_id} ({} videos) from {source}", playlist.videos.len());
        Ok(playlist.into_playlist(self.config.playlist_limit))
    }
}
