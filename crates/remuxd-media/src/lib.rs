//! mkvmerge CLI wrapper for track inspection and selective remuxing.
//!
//! This crate provides:
//! - Container inspection via `mkvmerge -J`
//! - The track-selection engine (language policy)
//! - Type-safe remux command building with exit-code interpretation
//! - Atomic in-place file replacement
//! - Recursive media file discovery

pub mod error;
pub mod inspect;
pub mod remux;
pub mod scan;
pub mod selection;

pub use error::{MediaError, MediaResult};
pub use inspect::inspect;
pub use remux::{remux_file, MkvmergeCommand, RemuxOutcome};
pub use scan::find_mkv_files;
pub use selection::{needs_remux, select_tracks};

/// Default language kept by the selection policy.
pub const DEFAULT_TARGET_LANGUAGE: &str = "eng";
