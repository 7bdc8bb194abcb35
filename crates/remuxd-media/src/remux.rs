//! mkvmerge remux command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

use remuxd_models::TrackSelection;

use crate::error::{MediaError, MediaResult};

/// mkvmerge's own convention: exit 1 means "completed with warnings"
/// and the output file is still usable.
const EXIT_WARNINGS: i32 = 1;

/// Result of a successful remux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemuxOutcome {
    /// Tool exited cleanly.
    Clean,
    /// Tool exited with warnings; output kept.
    Warnings(String),
}

/// Builder for an mkvmerge remux invocation.
///
/// Writes to a hidden temporary sibling of the input so the original
/// is never touched until the remux has fully succeeded.
#[derive(Debug, Clone)]
pub struct MkvmergeCommand {
    input: PathBuf,
    output: PathBuf,
    selection: TrackSelection,
}

impl MkvmergeCommand {
    pub fn new(input: impl AsRef<Path>, selection: TrackSelection) -> Self {
        let input = input.as_ref().to_path_buf();
        let output = temp_sibling(&input);
        Self {
            input,
            output,
            selection,
        }
    }

    /// Temporary output path the remux writes to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    ///
    /// Each track flag is omitted when its id list is empty; mkvmerge
    /// treats a missing flag as "keep everything of that kind".
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            self.output.to_string_lossy().into_owned(),
        ];

        if !self.selection.video_ids.is_empty() {
            args.push("--video-tracks".to_string());
            args.push(join_ids(&self.selection.video_ids));
        }

        if !self.selection.audio_ids.is_empty() {
            args.push("--audio-tracks".to_string());
            args.push(join_ids(&self.selection.audio_ids));
        }

        if !self.selection.subtitle_ids.is_empty() {
            args.push("--subtitle-tracks".to_string());
            args.push(join_ids(&self.selection.subtitle_ids));
        }

        args.push(self.input.to_string_lossy().into_owned());
        args
    }

    /// Run the remux and interpret the tool's exit code.
    ///
    /// On a fatal exit the temporary file is removed and the source is
    /// left untouched.
    pub async fn run(&self) -> MediaResult<RemuxOutcome> {
        which::which("mkvmerge").map_err(|_| MediaError::ToolNotFound)?;

        let args = self.build_args();
        debug!(input = %self.input.display(), "Running mkvmerge {}", args.join(" "));

        let output = Command::new("mkvmerge")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::remux_failed(&self.input, format!("failed to launch mkvmerge: {e}"), None)
            })?;

        match output.status.code() {
            Some(0) => Ok(RemuxOutcome::Clean),
            Some(EXIT_WARNINGS) => {
                let text = String::from_utf8_lossy(&output.stdout).into_owned();
                warn!(input = %self.input.display(), "mkvmerge completed with warnings");
                Ok(RemuxOutcome::Warnings(text))
            }
            code => {
                let _ = fs::remove_file(&self.output).await;
                Err(MediaError::remux_failed(
                    &self.input,
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                    code,
                ))
            }
        }
    }
}

/// Remux one file in place.
///
/// Runs the tool against a temporary sibling, then atomically renames
/// it over the original. A failed rename removes the temporary file
/// and fails the file, leaving the original intact.
pub async fn remux_file(path: impl AsRef<Path>, selection: TrackSelection) -> MediaResult<RemuxOutcome> {
    let path = path.as_ref();
    let cmd = MkvmergeCommand::new(path, selection);

    let outcome = cmd.run().await?;

    if let Err(e) = fs::rename(cmd.output(), path).await {
        let _ = fs::remove_file(cmd.output()).await;
        return Err(MediaError::replace_failed(path, e.to_string()));
    }

    info!(path = %path.display(), "Replaced original with remuxed file");
    Ok(outcome)
}

/// Hidden temporary sibling path: `/dir/.<name>.tmp.mkv`.
fn temp_sibling(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!(".{name}.tmp.mkv"))
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(video: &[i64], audio: &[i64], subtitles: &[i64]) -> TrackSelection {
        TrackSelection {
            video_ids: video.to_vec(),
            audio_ids: audio.to_vec(),
            subtitle_ids: subtitles.to_vec(),
        }
    }

    #[test]
    fn test_temp_sibling_naming() {
        let tmp = temp_sibling(Path::new("/media/tv/showA/ep1.mkv"));
        assert_eq!(tmp, Path::new("/media/tv/showA/.ep1.mkv.tmp.mkv"));
    }

    #[test]
    fn test_build_args_full_selection() {
        let cmd = MkvmergeCommand::new("/media/ep1.mkv", selection(&[0], &[1, 2], &[3]));
        let args = cmd.build_args();

        assert_eq!(
            args,
            vec![
                "-o",
                "/media/.ep1.mkv.tmp.mkv",
                "--video-tracks",
                "0",
                "--audio-tracks",
                "1,2",
                "--subtitle-tracks",
                "3",
                "/media/ep1.mkv",
            ]
        );
    }

    #[test]
    fn test_build_args_omits_empty_flags() {
        let cmd = MkvmergeCommand::new("/media/ep1.mkv", selection(&[0], &[1], &[]));
        let args = cmd.build_args();

        assert!(!args.contains(&"--subtitle-tracks".to_string()));
        assert!(args.contains(&"--video-tracks".to_string()));
        assert!(args.contains(&"--audio-tracks".to_string()));
    }

    #[test]
    fn test_build_args_input_is_last() {
        let cmd = MkvmergeCommand::new("/media/ep1.mkv", selection(&[0], &[1], &[]));
        let args = cmd.build_args();
        assert_eq!(args.last().unwrap(), "/media/ep1.mkv");
        assert_eq!(args[0], "-o");
    }

    #[tokio::test]
    async fn test_run_without_tool_or_bad_input_fails_per_file() {
        // Whatever the environment, a remux of a nonexistent path must
        // surface a MediaError rather than panic.
        let cmd = MkvmergeCommand::new("/nonexistent/ep1.mkv", selection(&[0], &[1], &[]));
        assert!(cmd.run().await.is_err());
    }
}
