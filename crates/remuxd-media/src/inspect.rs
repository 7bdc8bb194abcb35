//! Container inspection via `mkvmerge -J`.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use remuxd_models::{Track, TrackKind};

use crate::error::{MediaError, MediaResult};

/// mkvmerge identify output, reduced to the fields we consume.
#[derive(Debug, serde::Deserialize)]
struct IdentifyOutput {
    #[serde(default)]
    tracks: Vec<IdentifyTrack>,
}

#[derive(Debug, serde::Deserialize)]
struct IdentifyTrack {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: IdentifyProperties,
}

#[derive(Debug, Default, serde::Deserialize)]
struct IdentifyProperties {
    language: Option<String>,
}

/// Inspect a media container and return its tracks in container order.
///
/// Launch or parse failure is a per-file error; the caller skips the
/// file and keeps going.
pub async fn inspect(path: impl AsRef<Path>) -> MediaResult<Vec<Track>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("mkvmerge").map_err(|_| MediaError::ToolNotFound)?;

    let output = Command::new("mkvmerge")
        .arg("-J")
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::inspect_failed(
            path,
            format!("mkvmerge -J exited with {}", output.status),
            Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        ));
    }

    let identify: IdentifyOutput = serde_json::from_slice(&output.stdout)?;

    let tracks = identify
        .tracks
        .into_iter()
        .map(|t| {
            Track::new(
                t.id,
                TrackKind::from_inspector(&t.kind),
                t.properties.language.unwrap_or_else(|| "und".to_string()),
            )
        })
        .collect::<Vec<_>>();

    debug!(path = %path.display(), count = tracks.len(), "Inspected tracks");

    Ok(tracks)
}
