//! Concurrent tree scan with ordered delivery.
//!
//! Directory reads run on scoped threads gated by the [`Pool`]. Each started read reports
//! through its own one-shot channel, and a single consumer cursor walks siblings in listing
//! order, waiting on those channels. Observer calls and aggregate computation therefore
//! follow depth-first pre-order no matter when the reads finish.

use crossbeam_channel::{Receiver, bounded, select};
use log::debug;
use std::path::Path;
use std::thread::{self, Scope};

use super::cancel::CancelToken;
use super::pool::Pool;
use super::source::{DirItem, DirSource};
use crate::error::ScanError;
use crate::pattern::{Pattern, apply_pattern};
use crate::types::{File, Verdict};

/// How many enumerations the producer cursor may have in flight ahead of the consumer, per level.
pub const LOOKAHEAD: usize = 2;

/// Children of one directory, or why they could not be listed.
type Contents = Result<Vec<File>, ScanError>;

/// Scans a [`DirSource`] against depth-indexed patterns.
pub struct Scanner<S: DirSource> {
    source: S,
    patterns: Vec<Pattern>,
    pool: Pool,
    cancel: CancelToken,
}

impl<S: DirSource> Scanner<S> {
    /// Scanner allowing at most `concurrency` directory reads at once.
    pub fn new(source: S, patterns: Vec<Pattern>, concurrency: usize) -> Self {
        Self {
            source,
            patterns,
            pool: Pool::new(concurrency),
            cancel: CancelToken::new(),
        }
    }

    /// Use a shared cancel token (e.g. one fired by Ctrl+C).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scan without an observer.
    pub fn scan(&self) -> Result<Vec<File>, ScanError> {
        self.scan_with(|_| {})
    }

    /// Scan the whole tree, calling `on_file` once per node in depth-first pre-order.
    ///
    /// When `on_file` sees a node its `contents` are already listed but its descendant counts
    /// are not yet computed. Returns only after every started read has finished, also on error.
    pub fn scan_with<F>(&self, mut on_file: F) -> Result<Vec<File>, ScanError>
    where
        F: FnMut(&File),
    {
        debug!(
            "Scanning with {} pattern(s), concurrency {}",
            self.patterns.len(),
            self.pool.capacity()
        );
        self.cancel.check()?;
        let items = self.source.read_dir(Path::new("")).map_err(|err| ScanError::Read {
            path: ".".to_string(),
            source: err,
        })?;
        let mut files = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            self.cancel.check()?;
            files.push(new_file(&self.patterns, 0, index, item, "", "", Path::new("")));
        }

        let on_file: &mut dyn FnMut(&File) = &mut on_file;
        thread::scope(|scope| self.walk(scope, &mut files, on_file))?;
        debug!("Scan finished: {} top-level entries", files.len());
        Ok(files)
    }

    /// Walk one sibling list: the producer cursor starts reads for qualifying directories,
    /// the consumer cursor takes nodes in order, waits for their read, reports, and recurses.
    fn walk<'scope, 'env>(
        &'scope self,
        scope: &'scope Scope<'scope, 'env>,
        files: &mut [File],
        on_file: &mut dyn FnMut(&File),
    ) -> Result<(), ScanError> {
        let len = files.len();
        let mut pending: Vec<Option<Receiver<Contents>>> = Vec::with_capacity(len);
        pending.resize_with(len, || None);
        let mut produced = 0;
        let mut in_flight = 0;

        for consumed in 0..len {
            // Always reach the consumer's node; beyond it, stay within LOOKAHEAD.
            while produced < len && (produced <= consumed || in_flight < LOOKAHEAD) {
                let i = produced;
                produced += 1;
                if self.should_traverse(&files[i]) {
                    pending[i] = Some(self.enumerate(scope, &files[i])?);
                    in_flight += 1;
                }
            }

            let file = &mut files[consumed];
            if let Some(ready) = pending[consumed].take() {
                in_flight -= 1;
                file.contents = self.await_contents(&ready, file)?;
            }
            on_file(&*file);
            self.walk(scope, &mut file.contents, on_file)?;
            file.tally();
        }
        Ok(())
    }

    /// Directory, matched, and another pattern exists below it.
    fn should_traverse(&self, file: &File) -> bool {
        file.is_dir && file.verdict == Verdict::Matched && file.depth + 1 < self.patterns.len()
    }

    /// Take a pool slot and list `file` on a scoped thread. The slot is released before the
    /// result is sent on the returned one-shot channel.
    fn enumerate<'scope, 'env>(
        &'scope self,
        scope: &'scope Scope<'scope, 'env>,
        file: &File,
    ) -> Result<Receiver<Contents>, ScanError> {
        let permit = self.pool.acquire(&self.cancel)?;
        let (tx, rx) = bounded::<Contents>(1);

        let source = &self.source;
        let patterns = self.patterns.as_slice();
        let cancel = self.cancel.clone();
        let depth = file.depth + 1;
        let parent = file.path();
        let new_parent = file.new_path();
        let rel_path = file.rel_path.clone();
        scope.spawn(move || {
            let contents = read_contents(
                source,
                patterns,
                &cancel,
                depth,
                &parent,
                &new_parent,
                &rel_path,
            );
            drop(permit);
            let _ = tx.send(contents);
        });
        Ok(rx)
    }

    fn await_contents(&self, ready: &Receiver<Contents>, file: &File) -> Contents {
        self.cancel.check()?;
        select! {
            recv(ready) -> msg => msg.unwrap_or_else(|_| {
                Err(ScanError::Disconnected { path: file.path() })
            }),
            recv(self.cancel.signal()) -> _ => Err(ScanError::Cancelled),
        }
    }
}

/// List `rel_path` and classify each child at `depth`. `parent` names it in errors and paths.
fn read_contents<S: DirSource>(
    source: &S,
    patterns: &[Pattern],
    cancel: &CancelToken,
    depth: usize,
    parent: &str,
    new_parent: &str,
    rel_path: &Path,
) -> Contents {
    let items = source.read_dir(rel_path).map_err(|err| ScanError::Read {
        path: parent.to_string(),
        source: err,
    })?;
    let mut contents = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        cancel.check()?;
        contents.push(new_file(
            patterns, depth, index, item, parent, new_parent, rel_path,
        ));
    }
    Ok(contents)
}

/// Build a node from a listing entry. Verdict and new name come from the pattern at `depth` only.
pub fn new_file(
    patterns: &[Pattern],
    depth: usize,
    index: usize,
    item: DirItem,
    parent: &str,
    new_parent: &str,
    parent_rel: &Path,
) -> File {
    let (verdict, new_name) = apply_pattern(patterns, depth, &item.name);
    File {
        depth,
        index,
        rel_path: parent_rel.join(&item.raw),
        name: item.name,
        new_name,
        parent: parent.to_string(),
        new_parent: new_parent.to_string(),
        is_dir: item.is_dir,
        verdict,
        ..Default::default()
    }
}
