//! Media tracks and derived track selections.

use serde::{Deserialize, Serialize};

/// Kind of a media track inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitles,
    /// Anything the inspector reports that we do not act on (buttons, etc.).
    Other,
}

impl TrackKind {
    /// Map the inspector's `type` string to a kind.
    pub fn from_inspector(s: &str) -> Self {
        match s {
            "video" => TrackKind::Video,
            "audio" => TrackKind::Audio,
            "subtitles" => TrackKind::Subtitles,
            _ => TrackKind::Other,
        }
    }
}

/// One track of a media file, as reported by the container inspector.
///
/// Lifetime is one file's processing; tracks are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track id used by the remux tool for selection.
    pub id: i64,

    /// Track kind.
    pub kind: TrackKind,

    /// ISO 639-2 language code, "und" when the container does not say.
    pub language: String,
}

impl Track {
    pub fn new(id: i64, kind: TrackKind, language: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            language: language.into(),
        }
    }

    /// Whether this is an audio track in the given language.
    pub fn is_audio_in(&self, language: &str) -> bool {
        self.kind == TrackKind::Audio && self.language == language
    }
}

/// Track ids to keep when remuxing one file.
///
/// Derived once per file from its track list. `audio_ids` is non-empty
/// whenever the source has at least one audio track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    pub video_ids: Vec<i64>,
    pub audio_ids: Vec<i64>,
    pub subtitle_ids: Vec<i64>,
}

impl TrackSelection {
    /// True when nothing would be kept at all.
    pub fn is_empty(&self) -> bool {
        self.video_ids.is_empty() && self.audio_ids.is_empty() && self.subtitle_ids.is_empty()
    }
}
