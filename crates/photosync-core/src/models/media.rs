use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::FILE_TIMESTAMP_FORMAT;

/// Kind of media object carried by a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Document,
    Video,
    Animation,
    Audio,
    Voice,
    VideoNote,
}

impl MediaKind {
    pub const ALL: [MediaKind; 7] = [
        MediaKind::Photo,
        MediaKind::Document,
        MediaKind::Video,
        MediaKind::Animation,
        MediaKind::Audio,
        MediaKind::Voice,
        MediaKind::VideoNote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Document => "document",
            MediaKind::Video => "video",
            MediaKind::Animation => "animation",
            MediaKind::Audio => "audio",
            MediaKind::Voice => "voice",
            MediaKind::VideoNote => "video_note",
        }
    }

    /// Name used when the platform does not supply one.
    ///
    /// Photos, voice notes and video notes never carry a name, so theirs is
    /// always generated from `at`. Documents fall back to a plain `document`.
    pub fn default_file_name(&self, at: NaiveDateTime) -> String {
        let ts = at.format(FILE_TIMESTAMP_FORMAT);
        match self {
            MediaKind::Photo => format!("photo_{}.jpg", ts),
            MediaKind::Document => "document".to_string(),
            MediaKind::Video => format!("video_{}.mp4", ts),
            MediaKind::Animation => format!("animation_{}.gif", ts),
            MediaKind::Audio => format!("audio_{}.mp3", ts),
            MediaKind::Voice => format!("voice_{}.ogg", ts),
            MediaKind::VideoNote => format!("video_note_{}.mp4", ts),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "photo" => Ok(MediaKind::Photo),
            "document" => Ok(MediaKind::Document),
            "video" => Ok(MediaKind::Video),
            "animation" => Ok(MediaKind::Animation),
            "audio" => Ok(MediaKind::Audio),
            "voice" => Ok(MediaKind::Voice),
            "video_note" => Ok(MediaKind::VideoNote),
            other => Err(format!("Unknown media kind: {}", other)),
        }
    }
}

/// A media object extracted from one webhook delivery.
///
/// Holds the platform handle rather than the bytes; the orchestrator fetches
/// the payload once validation has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaObject {
    pub file_id: String,
    pub original_name: String,
    pub kind: MediaKind,
    /// Size reported by the platform, when it reported one
    pub size_bytes: Option<u64>,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub chat_label: Option<String>,
    pub explicit_command: Option<String>,
    pub chat_id: i64,
}
