//! Public types: the scanned tree, derived actions/omits, execution records, and options.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::utils::config::{DEFAULT_CONCURRENCY, DEFAULT_NAME_PREFIX};

/// Result of applying the pattern for a node's depth to its name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// No pattern governs this depth.
    #[default]
    NoPattern,
    /// A pattern exists and did not match.
    NotMatched,
    /// A pattern exists and matched (possibly with a new name).
    Matched,
}

impl Verdict {
    /// One-character marker used by verbose listings.
    pub fn marker(self) -> &'static str {
        match self {
            Verdict::Matched => "*",
            Verdict::NotMatched => " ",
            Verdict::NoPattern => "~",
        }
    }
}

/// One file-system entry in the scanned tree.
///
/// `verdict` and `new_name` depend only on `depth` and `name`. The three descendant
/// counts are filled in once `contents` is final and never change afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct File {
    pub depth: usize,
    /// Position among siblings in listing order.
    pub index: usize,
    pub name: String,
    pub new_name: String,
    /// Slash-joined original ancestor names ("" at depth 0).
    pub parent: String,
    /// Slash-joined ancestor names after proposed renames.
    pub new_parent: String,
    /// Path relative to the scan root built from the names exactly as listed. Reads use it,
    /// so entries whose names are not valid UTF-8 can still be traversed.
    pub rel_path: PathBuf,
    pub is_dir: bool,
    pub verdict: Verdict,
    pub descendants_matched: usize,
    pub descendants_not_matched: usize,
    pub descendant_actions: usize,
    /// Children in listing order; empty unless this directory was traversed.
    pub contents: Vec<File>,
}

impl File {
    /// True when the node would be renamed.
    pub fn actionable(&self) -> bool {
        self.new_name != self.name
    }

    /// Original path relative to the scan root.
    pub fn path(&self) -> String {
        join_rel(&self.parent, &self.name)
    }

    /// Path relative to the scan root once this node and its ancestors are renamed.
    pub fn new_path(&self) -> String {
        join_rel(&self.new_parent, &self.new_name)
    }

    /// Compute the descendant counts from the (already final) children.
    pub fn tally(&mut self) {
        let mut matched = 0;
        let mut not_matched = 0;
        let mut actions = 0;
        for child in &self.contents {
            matched += usize::from(child.verdict == Verdict::Matched) + child.descendants_matched;
            not_matched +=
                usize::from(child.verdict == Verdict::NotMatched) + child.descendants_not_matched;
            actions += usize::from(child.actionable()) + child.descendant_actions;
        }
        self.descendants_matched = matched;
        self.descendants_not_matched = not_matched;
        self.descendant_actions = actions;
    }

    fn display_name(&self) -> String {
        if self.actionable() {
            format!("{} → {}", self.name, self.new_name)
        } else {
            self.name.clone()
        }
    }

    /// Long form: `   3: [DIR] [*] name → new`.
    pub fn verbose_string(&self) -> String {
        let kind = if self.is_dir { "DIR" } else { "FILE" };
        format!(
            "{:>6} [{}] [{}] {}",
            format!("{}:", self.index),
            kind,
            self.verdict.marker(),
            self.display_name()
        )
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir { "D" } else { "F" };
        write!(f, "[{}] {}", kind, self.display_name())
    }
}

/// Join a slash-separated relative parent with a name (no leading slash at the root).
pub fn join_rel(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// A proposed rename, paths relative to the scan root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Action {
    pub old_path: String,
    pub new_path: String,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.old_path, self.new_path)
    }
}

/// A scanned entry excluded from the actions (verdict other than Matched).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Omit {
    pub path: String,
}

impl fmt::Display for Omit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Outcome of attempting one action. `error` is empty on success.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub old_path: String,
    pub new_path: String,
    pub error: String,
}

impl Record {
    pub fn succeeded(&self) -> bool {
        self.error.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded() {
            write!(f, "MOVE: {} → {}", self.old_path, self.new_path)
        } else {
            write!(
                f,
                "FAIL: {} → {}: {}",
                self.old_path, self.new_path, self.error
            )
        }
    }
}

/// Counts over a set of [`Record`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut s = Summary::default();
        for record in records {
            s.attempted += 1;
            if record.succeeded() {
                s.succeeded += 1;
            } else {
                s.failed += 1;
            }
        }
        s
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempted == 0 {
            return f.write_str("No moves attempted.");
        }
        let moves = pluralize(self.attempted, "move", "moves");
        match (self.succeeded, self.failed) {
            (s, fl) if s > 0 && fl > 0 => write!(f, "{s} of {moves} succeeded. {fl} failed."),
            (s, _) if s > 0 => write!(f, "{s} of {moves} succeeded."),
            (_, fl) if fl > 0 => write!(f, "{fl} of {moves} failed."),
            _ => write!(f, "{moves} attempted, but nothing happened."),
        }
    }
}

/// `1 item` / `3 items`.
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    match count {
        1 => format!("1 {singular}"),
        n => format!("{n} {plural}"),
    }
}

/// Lib-only options for [`scan_dir`](crate::scan_dir).
#[derive(Clone, Debug)]
pub struct ScanOpts {
    /// Raw pattern strings, one per depth (`exp`, `exp/sub`, `_`).
    pub patterns: Vec<String>,
    /// Maximum concurrent directory reads.
    pub concurrency: usize,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Full options (CLI). Use [`ScanOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Prefix for the proposed/omitted/results TSV files.
    pub name_prefix: String,
    /// Root of the tree to scan. Required by the time the run starts.
    pub root: Option<PathBuf>,
    /// Raw pattern strings, one per depth.
    pub patterns: Vec<String>,
    /// Verbose output (debug logging, long listing, scan counter).
    pub verbose: bool,
    /// Show matching files and directories after the scan.
    pub matched: bool,
    /// Show non-matching files and directories after the scan.
    pub unmatched: bool,
    /// Maximum concurrent directory reads.
    pub concurrency: usize,
    /// Offer to perform the renames.
    pub proceed: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            root: None,
            patterns: Vec::new(),
            verbose: false,
            matched: false,
            unmatched: false,
            concurrency: DEFAULT_CONCURRENCY,
            proceed: false,
        }
    }
}

impl From<&Opts> for ScanOpts {
    fn from(o: &Opts) -> Self {
        ScanOpts {
            patterns: o.patterns.clone(),
            concurrency: o.concurrency,
        }
    }
}
