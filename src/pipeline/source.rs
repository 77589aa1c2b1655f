//! Where directory listings come from.

use log::warn;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// One listed entry (symlinks are not followed).
///
/// `raw` is the name as the file system returned it and is what later reads are built from.
/// `name` is its UTF-8 form, used for matching and display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirItem {
    pub name: String,
    pub raw: OsString,
    pub is_dir: bool,
}

impl DirItem {
    pub fn new(raw: OsString, is_dir: bool) -> Self {
        let name = raw.to_string_lossy().into_owned();
        Self { name, raw, is_dir }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(OsString::from(name.into()), false)
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self::new(OsString::from(name.into()), true)
    }

    /// True when `name` had to be converted lossily.
    pub fn is_lossy(&self) -> bool {
        self.raw.to_str().is_none()
    }
}

/// A rooted tree that can be listed by relative path (the empty path is the root).
///
/// `rel` is built by joining raw [`DirItem::raw`] names, so it always names an entry that
/// was listed. Listings must come back in a stable order; that order becomes each node's
/// `index`. Called concurrently from enumeration units.
pub trait DirSource: Sync {
    fn read_dir(&self, rel: &Path) -> io::Result<Vec<DirItem>>;
}

/// [`DirSource`] over the local file system, rooted at `root`. Listings are sorted by name.
#[derive(Clone, Debug)]
pub struct OsDirSource {
    root: PathBuf,
}

impl OsDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &Path) -> PathBuf {
        if rel.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

impl DirSource for OsDirSource {
    fn read_dir(&self, rel: &Path) -> io::Result<Vec<DirItem>> {
        let dir = self.abs(rel);
        let mut items = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let item = DirItem::new(entry.file_name(), entry.file_type()?.is_dir());
            if item.is_lossy() {
                warn!(
                    "non-UTF-8 name in {}; matching against \"{}\"",
                    dir.display(),
                    item.name
                );
            }
            items.push(item);
        }
        items.sort_by(|a, b| a.raw.cmp(&b.raw));
        Ok(items)
    }
}
