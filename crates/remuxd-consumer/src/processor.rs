//! Per-delivery processing state machine.
//!
//! Received → decode → resolve → scan → per-file processing → decide.
//! Per-file failures degrade the delivery outcome but never abort it;
//! only malformed input, unknown categories, and missing directories
//! short-circuit straight to the dead-letter queue.

use std::path::Path;

use tracing::{debug, warn};

use remuxd_media::{find_mkv_files, inspect, needs_remux, remux_file, select_tracks};
use remuxd_models::{DeliveryOutcome, FileOutcome, TaskMessage};

use crate::logging::TaskLogger;
use crate::settings::CategoryMap;

/// What the dispatcher should do with the delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Publish a completion message for the work item, then ack.
    Done { identifier: String },
    /// Ack without a completion message; there was nothing to process.
    Empty,
    /// Publish a dead-letter envelope and reject without requeue.
    /// Retrying can never succeed without external reconfiguration.
    DeadLetter { reason: String },
    /// Leave the delivery unacknowledged so the broker redelivers it.
    /// Used when every attempted file failed transiently.
    Redeliver,
}

/// Read-only collaborators for delivery processing.
#[derive(Debug, Clone)]
pub struct ProcessorContext {
    pub categories: CategoryMap,
    pub target_language: String,
}

/// Run the state machine for one delivery body.
pub async fn process_delivery(ctx: &ProcessorContext, body: &[u8]) -> Disposition {
    let task = match TaskMessage::decode(body) {
        Ok(task) => task,
        Err(e) => {
            warn!(error = %e, "Rejecting undecodable message");
            return Disposition::DeadLetter {
                reason: e.to_string(),
            };
        }
    };

    let logger = TaskLogger::new(&task.torrent_name);

    let root = match ctx.categories.resolve(&task.category) {
        Some(root) => root,
        None => {
            let reason = format!("Unknown category: {}", task.category);
            logger.error(&reason);
            return Disposition::DeadLetter { reason };
        }
    };

    let folder = root.join(&task.torrent_name);
    match tokio::fs::metadata(&folder).await {
        Ok(meta) if meta.is_dir() => {}
        _ => {
            let reason = format!("Folder does not exist: {}", folder.display());
            logger.error(&reason);
            return Disposition::DeadLetter { reason };
        }
    }

    logger.start(&format!("scanning {}", folder.display()));

    let files = match find_mkv_files(&folder).await {
        Ok(files) => files,
        Err(e) => {
            logger.error(&format!("directory scan failed: {e}"));
            return Disposition::Redeliver;
        }
    };

    if files.is_empty() {
        logger.completion("no media files found, nothing to process");
        return Disposition::Empty;
    }

    logger.progress(&format!("found {} media files", files.len()));

    let mut outcomes = Vec::with_capacity(files.len());
    for file in &files {
        outcomes.push(process_file(ctx, &logger, file).await);
    }

    decide(&logger, &task.torrent_name, &outcomes)
}

/// Process one file: inspect, check policy, remux, replace.
async fn process_file(ctx: &ProcessorContext, logger: &TaskLogger, path: &Path) -> FileOutcome {
    let tracks = match inspect(path).await {
        Ok(tracks) => tracks,
        Err(e) => {
            logger.warning(&format!("inspection failed for {}: {e}", path.display()));
            return FileOutcome::Failed;
        }
    };

    if !needs_remux(&tracks, &ctx.target_language) {
        debug!(file = %path.display(), "File already satisfies the language policy, skipping");
        return FileOutcome::Skipped;
    }

    let selection = select_tracks(&tracks, &ctx.target_language);
    match remux_file(path, selection).await {
        Ok(_) => {
            logger.progress(&format!("remuxed {}", path.display()));
            FileOutcome::Remuxed
        }
        Err(e) => {
            logger.warning(&format!("remux failed for {}: {e}", path.display()));
            FileOutcome::Failed
        }
    }
}

/// Map the aggregate outcome to an acknowledgment decision.
fn decide(logger: &TaskLogger, identifier: &str, outcomes: &[FileOutcome]) -> Disposition {
    match DeliveryOutcome::from_files(outcomes) {
        DeliveryOutcome::AllHandled => {
            logger.completion("all files handled");
            Disposition::Done {
                identifier: identifier.to_string(),
            }
        }
        DeliveryOutcome::PartialFailure => {
            logger.completion("completed with some files failed");
            Disposition::Done {
                identifier: identifier.to_string(),
            }
        }
        DeliveryOutcome::HardFailure => {
            logger.warning("no files were successfully processed, leaving message for redelivery");
            Disposition::Redeliver
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remuxd_models::FileOutcome::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn context(categories: HashMap<String, PathBuf>) -> ProcessorContext {
        ProcessorContext {
            categories: CategoryMap::new(categories),
            target_language: "eng".to_string(),
        }
    }

    fn tv_context(root: &Path) -> ProcessorContext {
        let mut categories = HashMap::new();
        categories.insert("tv".to_string(), root.to_path_buf());
        context(categories)
    }

    #[tokio::test]
    async fn test_malformed_body_is_dead_lettered() {
        let ctx = context(HashMap::new());
        let disposition = process_delivery(&ctx, b"not json").await;

        match disposition {
            Disposition::DeadLetter { reason } => {
                assert!(reason.contains("JSON parsing error"));
            }
            other => panic!("expected DeadLetter, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_category_is_dead_lettered() {
        let ctx = context(HashMap::new());
        let body = br#"{"torrentName":"showA","category":"ghost"}"#;
        let disposition = process_delivery(&ctx, body).await;

        match disposition {
            Disposition::DeadLetter { reason } => {
                assert!(reason.contains("Unknown category: ghost"));
            }
            other => panic!("expected DeadLetter, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_folder_is_dead_lettered() {
        let dir = TempDir::new().unwrap();
        let ctx = tv_context(dir.path());
        let body = br#"{"torrentName":"showA","category":"tv"}"#;
        let disposition = process_delivery(&ctx, body).await;

        match disposition {
            Disposition::DeadLetter { reason } => {
                assert!(reason.contains("Folder does not exist"));
                assert!(reason.contains("showA"));
            }
            other => panic!("expected DeadLetter, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_folder_is_acknowledged() {
        let dir = TempDir::new().unwrap();
        tokio::fs::create_dir(dir.path().join("showA")).await.unwrap();

        let ctx = tv_context(dir.path());
        let body = br#"{"torrentName":"showA","category":"tv"}"#;
        let disposition = process_delivery(&ctx, body).await;

        assert_eq!(disposition, Disposition::Empty);
    }

    #[test]
    fn test_decide_success_paths() {
        let logger = TaskLogger::new("showA");

        for outcomes in [
            vec![Remuxed],
            vec![Skipped, Skipped],
            vec![Remuxed, Failed],
            vec![Remuxed, Skipped, Failed],
        ] {
            let disposition = decide(&logger, "showA", &outcomes);
            assert_eq!(
                disposition,
                Disposition::Done {
                    identifier: "showA".to_string()
                },
                "outcomes {outcomes:?}"
            );
        }
    }

    #[test]
    fn test_decide_redelivery_paths() {
        let logger = TaskLogger::new("showA");

        for outcomes in [vec![Failed], vec![Failed, Failed], vec![Skipped, Failed]] {
            let disposition = decide(&logger, "showA", &outcomes);
            assert_eq!(disposition, Disposition::Redeliver, "outcomes {outcomes:?}");
        }
    }
}
