use eyre::Result;
use serde::Serialize;

use crate::link::IdentifierPair;
use crate::metadata::VideoMetadata;
use crate::playlist::Playlist;

/// Render any result as pretty JSON
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_identifiers_text(ids: &IdentifierPair) -> String {
    let mut lines = vec![
        format!("Video:    {}", ids.video_id.as_deref().unwrap_or("-")),
        format!("Playlist: {}", ids.playlist_id.as_deref().unwrap_or("-")),
    ];
    if let Some(path) = ids.watch_path() {
        lines.push(format!("Watch:    {path}"));
    }
    lines.join("\n")
}

pub fn render_metadata_text(meta: &VideoMetadata) -> String {
    format!(
        "{}\n{}\n{} views · {} · {} · {} likes\n{}\n\n{}",
        meta.title,
        meta.channel_title,
        meta.view_count,
        meta.published_at,
        meta.duration,
        meta.like_count,
        meta.thumbnail_url,
        meta.description,
    )
    .trim_end()
    .to_string()
}

/// One line per video, numbered by playlist position
pub fn render_playlist_text(playlist: &Playlist) -> String {
    let mut out = vec![playlist.title.clone()];
    if !playlist.description.is_empty() {
        out.push(playlist.description.clone());
    }
    out.push(String::new());
    out.extend(
        playlist
            .videos
            .iter()
            .map(|v| format!("{:>3}. [{}] {} ({}) {}", v.index, v.duration, v.title, v.channel_title, v.id)),
    );
    out.join("\n")
}
