//! Progress counter shown while scanning.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Advance the bar by `n`. Uses try_lock so a contended bar skips the update instead of blocking.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Force a final refresh so the last count is drawn, then end the line.
pub fn finish_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.refresh();
        eprintln!();
    }
}

/// Scan observer: advances `bar` once per scanned entry. `None` when not verbose.
pub fn scan_observer(bar: &Option<ProgressBar>) -> impl FnMut(&crate::File) + use<> {
    let bar = bar.clone();
    move |_file: &crate::File| {
        if let Some(bar) = &bar {
            update_progress_bar(bar, 1);
        }
    }
}
