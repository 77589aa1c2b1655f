//! Renamer: concurrent depth-indexed pattern scanning and rename planning

pub mod engine;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod plan;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{PatternError, ScanError};
pub use pattern::{Pattern, apply_pattern, parse_patterns};
pub use pipeline::{CancelToken, DirItem, DirSource, OsDirSource, Pool, Scanner};
pub use plan::{build_actions, build_omitted};

use log::debug;
use std::path::Path;

/// Result alias used by public renamer API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: scan `root` with `opts` and return the finished tree.
///
/// - **`on_file: None`** → plain scan.
/// - **`on_file: Some(f)`** → `f` is called once per entry in depth-first pre-order, on the calling thread, while the scan runs. Keep it fast.
///
/// Fails with [`PatternError`] for bad patterns (before any read), [`ScanError::Read`] when a
/// directory cannot be listed, or [`ScanError::Cancelled`] once `cancel` fires.
pub fn scan_dir<F>(
    root: &Path,
    opts: &ScanOpts,
    cancel: &CancelToken,
    on_file: Option<F>,
) -> Result<Vec<File>>
where
    F: FnMut(&File),
{
    debug!(
        "{} CONFIG:{:#?}",
        utils::PackagePaths::get().env_prefix(),
        opts
    );
    let patterns = parse_patterns(&opts.patterns)?;
    let scanner =
        Scanner::new(OsDirSource::new(root), patterns, opts.concurrency).with_cancel(cancel.clone());
    let files = match on_file {
        None => scanner.scan()?,
        Some(f) => scanner.scan_with(f)?,
    };
    Ok(files)
}
