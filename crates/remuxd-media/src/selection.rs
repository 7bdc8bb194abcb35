//! Track-selection engine.
//!
//! The language policy: keep every video track, keep audio and subtitle
//! tracks matching the target language, and fall back to keeping all
//! audio rather than producing an audio-less file.

use remuxd_models::{Track, TrackKind, TrackSelection};
use tracing::debug;

/// Whether a file needs remuxing at all.
///
/// True iff at least one audio track's language differs from the
/// target. Only audio tracks are considered; a file with no audio never
/// needs a remux.
pub fn needs_remux(tracks: &[Track], target_language: &str) -> bool {
    tracks
        .iter()
        .any(|t| t.kind == TrackKind::Audio && t.language != target_language)
}

/// Derive the track ids to keep for one file.
///
/// Video is always kept. Audio and subtitles are kept iff their
/// language equals the target. An empty audio result falls back to
/// keeping all audio tracks; this is a deliberate safety net, not an
/// error.
pub fn select_tracks(tracks: &[Track], target_language: &str) -> TrackSelection {
    let mut selection = TrackSelection::default();

    for track in tracks {
        match track.kind {
            TrackKind::Video => selection.video_ids.push(track.id),
            TrackKind::Audio if track.language == target_language => {
                selection.audio_ids.push(track.id)
            }
            TrackKind::Subtitles if track.language == target_language => {
                selection.subtitle_ids.push(track.id)
            }
            _ => {}
        }
    }

    if selection.audio_ids.is_empty() {
        let all_audio: Vec<i64> = tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Audio)
            .map(|t| t.id)
            .collect();
        if !all_audio.is_empty() {
            debug!(
                target = target_language,
                "No audio track matches the target language, keeping all audio"
            );
            selection.audio_ids = all_audio;
        }
    }

    selection
}
