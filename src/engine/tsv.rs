//! Tab-separated output: proposed actions, omitted entries, and a streamed results log.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::types::{Action, Omit, Record};

fn tsv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(w)
}

/// Serialize `rows` (header first) to `w`.
pub fn write_rows<W: Write, T: Serialize>(w: W, rows: &[T]) -> Result<()> {
    let mut wtr = tsv_writer(w);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_actions(out: &Path, actions: &[Action]) -> Result<()> {
    let f = File::create(out).with_context(|| format!("create {}", out.display()))?;
    write_rows(f, actions).with_context(|| format!("write actions to {}", out.display()))
}

pub fn write_omitted(out: &Path, omitted: &[Omit]) -> Result<()> {
    let f = File::create(out).with_context(|| format!("create {}", out.display()))?;
    write_rows(f, omitted).with_context(|| format!("write omitted to {}", out.display()))
}

/// Handles for a results file written on a background thread.
/// Drop (or [`RecordStream::finish`]) the sender side to let the writer complete.
pub struct RecordStream {
    pub tx: Sender<Record>,
    pub handle: JoinHandle<Result<()>>,
    pub path: PathBuf,
}

impl RecordStream {
    /// Close the channel and wait for the writer to flush.
    pub fn finish(self) -> Result<()> {
        drop(self.tx);
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("results writer thread panicked"))?
    }
}

/// Create `out` now and append every record received until the sender is dropped.
pub fn write_record_stream(out: &Path) -> Result<RecordStream> {
    let f = File::create(out).with_context(|| format!("create {}", out.display()))?;
    let (tx, rx) = unbounded::<Record>();
    let path = out.to_path_buf();
    let handle = thread::spawn(move || record_writer_loop(f, rx));
    Ok(RecordStream { tx, handle, path })
}

fn record_writer_loop<W: Write>(w: W, rx: Receiver<Record>) -> Result<()> {
    let mut wtr = tsv_writer(w);
    while let Ok(record) = rx.recv() {
        wtr.serialize(&record)?;
        wtr.flush()?;
    }
    wtr.flush()?;
    Ok(())
}
