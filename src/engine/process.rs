//! Sequential rename executor.

use crossbeam_channel::Sender;
use log::{error, info};
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::pipeline::CancelToken;
use crate::types::{Action, Record};

/// What [`process`] did before it finished or was interrupted.
#[derive(Debug, Default)]
pub struct Processed {
    pub records: Vec<Record>,
    /// Set when cancellation stopped the run early.
    pub interrupted: Option<ScanError>,
}

/// Perform `actions` one at a time, in order. A failed rename is recorded and the run
/// continues; only cancellation stops it. Each record is also sent on `progress` if given.
pub fn process(
    root: &Path,
    actions: &[Action],
    cancel: &CancelToken,
    progress: Option<&Sender<Record>>,
) -> Processed {
    let mut out = Processed::default();
    for (i, action) in actions.iter().enumerate() {
        if let Err(e) = cancel.check() {
            out.interrupted = Some(e);
            break;
        }
        let from = native_path(root, &action.old_path);
        let to = native_path(root, &action.new_path);
        info!("Performing action {}: {} → {}", i, from.display(), to.display());

        let mut record = Record {
            old_path: from.display().to_string(),
            new_path: to.display().to_string(),
            error: String::new(),
        };
        if let Err(e) = std::fs::rename(&from, &to) {
            error!("FAILED: {} → {}: {}", from.display(), to.display(), e);
            record.error = e.to_string();
        }
        if let Some(tx) = progress {
            let _ = tx.send(record.clone());
        }
        out.records.push(record);
    }
    out
}

/// Join a slash-separated relative path onto `root` using the platform separator.
fn native_path(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|seg| !seg.is_empty())
        .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
}
