//! Video URL identification for video materials.
//!
//! Admins paste whatever share URL they have; the client needs the provider
//! and bare video id to build an embed URL. Recognizes YouTube watch, short,
//! shorts and embed URLs, and numeric Vimeo URLs.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static YOUTUBE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
            .expect("valid regex"),
        Regex::new(r"youtube\.com/shorts/([^&\n?#]+)").expect("valid regex"),
    ]
});

static VIMEO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("valid regex"));

/// A recognized video reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum VideoRef {
    Youtube { id: String },
    Vimeo { id: String },
}

/// Extract the provider and video id from a pasted URL. YouTube patterns are
/// tried first, then Vimeo; an unrecognized URL yields `None`.
#[must_use]
pub fn extract_video_ref(url: &str) -> Option<VideoRef> {
    for pattern in YOUTUBE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(url) {
            return Some(VideoRef::Youtube {
                id: captures[1].to_string(),
            });
        }
    }

    VIMEO_PATTERN.captures(url).map(|captures| VideoRef::Vimeo {
        id: captures[1].to_string(),
    })
}

impl VideoRef {
    /// The iframe embed URL for this video.
    #[must_use]
    pub fn embed_url(&self) -> String {
        match self {
            Self::Youtube { id } => format!("https://www.youtube.com/embed/{id}"),
            Self::Vimeo { id } => format!("https://player.vimeo.com/video/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_youtube_watch_url() {
        let found = extract_video_ref("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            found,
            Some(VideoRef::Youtube {
                id: "dQw4w9WgXcQ".into()
            })
        );
    }

    #[test]
    fn recognizes_short_url() {
        let found = extract_video_ref("https://youtu.be/dQw4w9WgXcQ?t=42");
        assert_eq!(
            found,
            Some(VideoRef::Youtube {
                id: "dQw4w9WgXcQ".into()
            })
        );
    }

    #[test]
    fn recognizes_embed_url() {
        let found = extract_video_ref("https://www.youtube.com/embed/abc123");
        assert_eq!(found, Some(VideoRef::Youtube { id: "abc123".into() }));
    }

    #[test]
    fn recognizes_shorts_url() {
        let found = extract_video_ref("https://www.youtube.com/shorts/xyz789");
        assert_eq!(found, Some(VideoRef::Youtube { id: "xyz789".into() }));
    }

    #[test]
    fn watch_id_stops_at_query_separator() {
        let found = extract_video_ref("https://www.youtube.com/watch?v=abc123&list=PL0");
        assert_eq!(found, Some(VideoRef::Youtube { id: "abc123".into() }));
    }

    #[test]
    fn recognizes_vimeo_url() {
        let found = extract_video_ref("https://vimeo.com/123456789");
        assert_eq!(
            found,
            Some(VideoRef::Vimeo {
                id: "123456789".into()
            })
        );
    }

    #[test]
    fn rejects_unrecognized_url() {
        assert_eq!(extract_video_ref("https://example.com/video.mp4"), None);
        assert_eq!(extract_video_ref("not a url"), None);
    }

    #[test]
    fn builds_embed_urls() {
        let youtube = VideoRef::Youtube { id: "abc".into() };
        assert_eq!(youtube.embed_url(), "https://www.youtube.com/embed/abc");
        let vimeo = VideoRef::Vimeo { id: "42".into() };
        assert_eq!(vimeo.embed_url(), "https://player.vimeo.com/video/42");
    }
}
