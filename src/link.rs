use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

// Later rules are more specific and override earlier matches.
static VIDEO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
        r"youtube\.com/watch\?.*v=([^&\n?#]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid video pattern"))
    .collect()
});

static PLAYLIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"[?&]list=([^&\n?#]+)", r"youtube\.com/playlist\?list=([^&\n?#]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("valid playlist pattern"))
        .collect()
});

/// Video and playlist identifiers found in a pasted link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierPair {
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
}

impl IdentifierPair {
    /// True when the input held no recognizable identifier
    pub fn is_empty(&self) -> bool {
        self.video_id.is_none() && self.playlist_id.is_none()
    }

    /// Navigation path for the watch view, e.g. `/watch?v=ID&list=PL`
    pub fn watch_path(&self) -> Option<String> {
        let params: Vec<String> = [("v", &self.video_id), ("list", &self.playlist_id)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
            .collect();

        if params.is_empty() {
            None
        } else {
            Some(format!("/watch?{}", params.join("&")))
        }
    }
}

fn last_match(patterns: &[Regex], input: &str) -> Option<String> {
    patterns
        .iter()
        .filter_map(|re| re.captures(input))
        .last()
        .map(|caps| caps[1].to_string())
}

/// Extract video and playlist identifiers from an arbitrary string.
///
/// Every rule is tried and the last one that matches wins. Captures end at the
/// first `&`, `?`, `#` or newline; anything else ends up in the identifier.
pub fn extract(raw: &str) -> IdentifierPair {
    IdentifierPair {
        video_id: last_match(&VIDEO_PATTERNS, raw),
        playlist_id: last_match(&PLAYLIST_PATTERNS, raw),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThumbnailQuality {
    Default,
    #[default]
    Medium,
    High,
    MaxRes,
}

impl ThumbnailQuality {
    fn file_stem(&self) -> &str {
        match self {
            ThumbnailQuality::Default => "default",
            ThumbnailQuality::Medium => "mqdefault",
            ThumbnailQuality::High => "hqdefault",
            ThumbnailQuality::MaxRes => "maxresdefault",
        }
    }
}

/// Static thumbnail URL for a video
pub fn thumbnail_url(video_id: &str, quality: ThumbnailQuality) -> String {
    format!("https://img.youtube.com/vi/{video_id}/{}.jpg", quality.file_stem())
}
