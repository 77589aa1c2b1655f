//! Scanner tests: ordering, pruning, aggregates, failures, and cancellation against an
//! in-memory directory source that records every read.

use renamer::pipeline::{CancelToken, DirItem, DirSource, LOOKAHEAD, OsDirSource, Pool, Scanner};
use renamer::plan::walk_descending;
use renamer::{File, ScanError, Verdict, build_actions, build_omitted, parse_patterns};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct FakeFs {
    dirs: HashMap<String, (Vec<DirItem>, Duration)>,
    fail: Option<String>,
    cancel_on: Option<(String, CancelToken)>,
    reads: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeFs {
    fn new() -> Self {
        Self::default()
    }

    fn dir(mut self, rel: &str, items: Vec<DirItem>) -> Self {
        self.dirs.insert(rel.to_string(), (items, Duration::ZERO));
        self
    }

    fn failing(mut self, rel: &str) -> Self {
        self.fail = Some(rel.to_string());
        self
    }

    fn cancel_on(mut self, rel: &str, token: &CancelToken) -> Self {
        self.cancel_on = Some((rel.to_string(), token.clone()));
        self
    }

    fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    fn was_read(&self, rel: &str) -> bool {
        self.reads().iter().any(|r| r == rel)
    }
}

/// Slash-joined key for a relative path ("" for the root).
fn key(rel: &Path) -> String {
    rel.iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl DirSource for FakeFs {
    fn read_dir(&self, rel: &Path) -> io::Result<Vec<DirItem>> {
        let rel = key(rel);
        let rel = rel.as_str();
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.reads.lock().unwrap().push(rel.to_string());
        if let Some((path, token)) = &self.cancel_on
            && path == rel
        {
            token.cancel();
        }
        let result = match self.dirs.get(rel) {
            _ if self.fail.as_deref() == Some(rel) => {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
            Some((items, delay)) => {
                thread::sleep(*delay);
                Ok(items.clone())
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such directory")),
        };
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn d(name: &str) -> DirItem {
    DirItem::dir(name)
}

fn f(name: &str) -> DirItem {
    DirItem::file(name)
}

fn scanner(fs: FakeFs, patterns: &[&str], concurrency: usize) -> Scanner<FakeFs> {
    Scanner::new(fs, parse_patterns(patterns).unwrap(), concurrency)
}

/// `fanout` subdirectories and two files per directory, `levels` listings deep. Earlier
/// siblings are slower, so reads finish out of listing order.
fn wide_tree(levels: usize, fanout: usize) -> FakeFs {
    let mut fs = FakeFs::new();
    fill(&mut fs, "", 0, levels, fanout, 0);
    fs
}

fn fill(fs: &mut FakeFs, rel: &str, level: usize, levels: usize, fanout: usize, sibling: usize) {
    let leaf = level + 1 == levels;
    let mut items = Vec::new();
    if !leaf {
        items.extend((0..fanout).map(|i| d(&format!("d{i}"))));
    }
    items.push(f("a.txt"));
    items.push(f("b.txt"));
    let delay = Duration::from_millis((fanout - sibling) as u64);
    fs.dirs.insert(rel.to_string(), (items, delay));
    if !leaf {
        for i in 0..fanout {
            let child = if rel.is_empty() {
                format!("d{i}")
            } else {
                format!("{rel}/d{i}")
            };
            fill(fs, &child, level + 1, levels, fanout, i);
        }
    }
}

fn preorder_paths(files: &[File]) -> Vec<String> {
    let mut out = Vec::new();
    walk_descending(files, None, &mut |file| out.push(file.path()));
    out
}

fn find<'a>(files: &'a [File], path: &str) -> &'a File {
    let mut found = None;
    walk_descending(files, None, &mut |file| {
        if file.path() == path {
            found = Some(file);
        }
    });
    found.unwrap_or_else(|| panic!("{path} not in tree"))
}

// --- ordering ---

#[test]
fn test_callback_order_is_preorder() {
    let s = scanner(wide_tree(4, 3), &["_", "_", "_", "_"], 8);
    let mut seen = Vec::new();
    let files = s.scan_with(|file| seen.push(file.path())).unwrap();
    assert_eq!(seen, preorder_paths(&files));
    assert!(seen.len() > 40);
}

#[test]
fn test_callback_order_independent_of_concurrency() {
    let patterns = ["_", "_", "_", "_"];
    let mut serial = Vec::new();
    scanner(wide_tree(4, 3), &patterns, 1)
        .scan_with(|file| serial.push(file.path()))
        .unwrap();
    for concurrency in [2, 4, 32] {
        let mut parallel = Vec::new();
        scanner(wide_tree(4, 3), &patterns, concurrency)
            .scan_with(|file| parallel.push(file.path()))
            .unwrap();
        assert_eq!(serial, parallel, "concurrency {concurrency}");
    }
}

#[test]
fn test_sibling_index_follows_listing_order() {
    let fs = FakeFs::new().dir("", vec![f("zeta"), d("alpha"), f("mid")]);
    let files = scanner(fs, &["_"], 4).scan().unwrap();
    let names: Vec<_> = files.iter().map(|f| (f.index, f.name.as_str())).collect();
    assert_eq!(names, vec![(0, "zeta"), (1, "alpha"), (2, "mid")]);
}

#[test]
fn test_observer_sees_contents_before_aggregates() {
    let fs = FakeFs::new()
        .dir("", vec![d("top")])
        .dir("top", vec![f("x"), f("y")]);
    let mut at_callback = Vec::new();
    let files = scanner(fs, &["_", "_"], 2)
        .scan_with(|file| {
            if file.name == "top" {
                at_callback.push((file.contents.len(), file.descendants_matched));
            }
        })
        .unwrap();
    assert_eq!(at_callback, vec![(2, 0)]);
    assert_eq!(files[0].descendants_matched, 2);
}

// --- concurrency bound ---

#[test]
fn test_reads_never_exceed_pool_capacity() {
    for concurrency in [1, 2, 3] {
        let fs = wide_tree(3, 4);
        let s = scanner(fs, &["_", "_", "_"], concurrency);
        s.scan().unwrap();
        // The root listing happens before any unit starts, so it never overlaps.
        let max = s.source().max_active.load(Ordering::SeqCst);
        assert!(max <= concurrency, "max {max} > {concurrency}");
    }
}

#[test]
fn test_producer_stays_within_lookahead() {
    let names: Vec<String> = (0..8).map(|i| format!("d{i}")).collect();
    let mut fs = FakeFs::new().dir("", names.iter().map(|n| d(n)).collect());
    for name in &names {
        fs.dirs
            .insert(name.clone(), (vec![f("x")], Duration::from_millis(15)));
    }
    // Pool is wide enough that only the look-ahead limits how many reads start.
    let s = scanner(fs, &["_", "_"], 16);
    let mut started_at = Vec::new();
    s.scan_with(|file| {
        if file.depth != 0 {
            return;
        }
        // Give any read started too early time to show up.
        thread::sleep(Duration::from_millis(5));
        let started = s.source().reads().iter().filter(|r| !r.is_empty()).count();
        started_at.push((file.index, started));
    })
    .unwrap();

    assert_eq!(started_at.len(), names.len());
    for (index, started) in started_at {
        assert!(started > index, "read of d{index} not started when consumed");
        assert!(
            started <= index + LOOKAHEAD,
            "{started} reads started when consuming d{index}"
        );
    }
    assert_eq!(s.source().reads().len(), names.len() + 1);
}

// --- pruning ---

#[test]
fn test_unmatched_directory_never_read() {
    let fs = FakeFs::new()
        .dir("", vec![d("keep"), d("skip")])
        .dir("keep", vec![f("a")])
        .dir("skip", vec![f("b")]);
    let s = scanner(fs, &["^keep$", "_"], 4);
    let files = s.scan().unwrap();
    assert!(s.source().was_read("keep"));
    assert!(!s.source().was_read("skip"));
    assert_eq!(files[1].verdict, Verdict::NotMatched);
    assert!(files[1].contents.is_empty());
}

#[test]
fn test_directory_at_last_pattern_depth_never_read() {
    let fs = FakeFs::new()
        .dir("", vec![d("a")])
        .dir("a", vec![d("b")])
        .dir("a/b", vec![f("deep")]);
    let s = scanner(fs, &["_", "_"], 4);
    let files = s.scan().unwrap();
    assert_eq!(s.source().reads(), vec!["".to_string(), "a".to_string()]);
    let b = find(&files, "a/b");
    assert_eq!(b.verdict, Verdict::Matched);
    assert!(b.contents.is_empty());
}

#[test]
fn test_no_patterns_reads_only_root() {
    let fs = FakeFs::new()
        .dir("", vec![d("a"), f("x")])
        .dir("a", vec![f("y")]);
    let s = scanner(fs, &[], 4);
    let files = s.scan().unwrap();
    assert_eq!(s.source().reads(), vec!["".to_string()]);
    assert!(files.iter().all(|f| f.verdict == Verdict::NoPattern));
    assert!(build_actions(&files).is_empty());
    assert!(build_omitted(&files).is_empty());
}

#[test]
fn test_files_are_not_read_even_when_matched() {
    let fs = FakeFs::new().dir("", vec![f("plain")]);
    let s = scanner(fs, &["_", "_"], 4);
    s.scan().unwrap();
    assert_eq!(s.source().reads(), vec!["".to_string()]);
}

// --- verdicts and paths ---

#[test]
fn test_verdict_ignores_siblings_and_order() {
    let a = FakeFs::new()
        .dir("", vec![d("x"), d("Project-1"), f("other")])
        .dir("x", vec![])
        .dir("Project-1", vec![]);
    let b = FakeFs::new()
        .dir("", vec![f("other"), d("Project-1")])
        .dir("Project-1", vec![]);
    let patterns = [r"^project-(\d+)$/P$1", "_"];
    let fa = scanner(a, &patterns, 2).scan().unwrap();
    let fb = scanner(b, &patterns, 2).scan().unwrap();
    let (na, nb) = (find(&fa, "Project-1"), find(&fb, "Project-1"));
    assert_eq!((na.verdict, na.new_name.as_str()), (Verdict::Matched, "P1"));
    assert_eq!((nb.verdict, nb.new_name.as_str()), (na.verdict, na.new_name.as_str()));
}

#[test]
fn test_new_parent_tracks_renamed_ancestors() {
    let fs = FakeFs::new()
        .dir("", vec![d("old")])
        .dir("old", vec![d("inner")])
        .dir("old/inner", vec![f("leaf.txt")]);
    let files = scanner(fs, &["^old$/new", "^inner$/core", "_"], 4)
        .scan()
        .unwrap();
    let leaf = find(&files, "old/inner/leaf.txt");
    assert_eq!(leaf.parent, "old/inner");
    assert_eq!(leaf.new_parent, "new/core");
    assert_eq!(leaf.new_path(), "new/core/leaf.txt");
}

// --- aggregates ---

fn check_aggregates(files: &[File]) {
    for file in files {
        let matched: usize = file
            .contents
            .iter()
            .map(|c| usize::from(c.verdict == Verdict::Matched) + c.descendants_matched)
            .sum();
        let not_matched: usize = file
            .contents
            .iter()
            .map(|c| usize::from(c.verdict == Verdict::NotMatched) + c.descendants_not_matched)
            .sum();
        let actions: usize = file
            .contents
            .iter()
            .map(|c| usize::from(c.actionable()) + c.descendant_actions)
            .sum();
        assert_eq!(file.descendants_matched, matched, "{}", file.path());
        assert_eq!(file.descendants_not_matched, not_matched, "{}", file.path());
        assert_eq!(file.descendant_actions, actions, "{}", file.path());
        check_aggregates(&file.contents);
    }
}

#[test]
fn test_aggregates_roll_up() {
    let fs = FakeFs::new()
        .dir("", vec![d("a"), d("b")])
        .dir("a", vec![d("a1"), f("a.log"), f("keep.txt")])
        .dir("a/a1", vec![f("x.log"), f("y.txt")])
        .dir("b", vec![f("z.log")]);
    let files = scanner(fs, &["_", r"^(a1|.*\.log)$", r"\.log$/.txt"], 4)
        .scan()
        .unwrap();
    check_aggregates(&files);
    let a = find(&files, "a");
    assert_eq!(a.descendants_matched, 3); // a1, a.log, x.log
    assert_eq!(a.descendants_not_matched, 2); // keep.txt, y.txt
    assert_eq!(a.descendant_actions, 1); // x.log -> x.txt
}

#[test]
fn test_aggregates_on_wide_tree() {
    let files = scanner(wide_tree(3, 3), &["_", "^d1$", "_"], 4)
        .scan()
        .unwrap();
    check_aggregates(&files);
}

// --- failures ---

#[test]
fn test_root_read_failure() {
    let s = scanner(FakeFs::new(), &["_"], 4);
    match s.scan() {
        Err(ScanError::Read { path, .. }) => assert_eq!(path, "."),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn test_subdirectory_read_failure_aborts_scan() {
    let fs = FakeFs::new()
        .dir("", vec![d("a"), d("b"), d("c")])
        .dir("a", vec![])
        .dir("b", vec![])
        .dir("c", vec![])
        .failing("b");
    let s = scanner(fs, &["_", "_"], 4);
    match s.scan() {
        Err(ScanError::Read { path, source }) => {
            assert_eq!(path, "b");
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected read error, got {other:?}"),
    }
    assert_eq!(s.source().active.load(Ordering::SeqCst), 0);
}

// --- cancellation ---

#[test]
fn test_cancel_mid_scan_settles_all_units() {
    let token = CancelToken::new();
    let fs = wide_tree(4, 3).cancel_on("d0/d1", &token);
    let s = scanner(fs, &["_", "_", "_", "_"], 4).with_cancel(token.clone());
    let err = s.scan().unwrap_err();
    assert!(err.is_cancelled(), "got {err:?}");
    // scan returned, so every started read has finished.
    assert_eq!(s.source().active.load(Ordering::SeqCst), 0);
    assert!(token.is_cancelled());
}

#[test]
fn test_cancel_before_scan() {
    let token = CancelToken::new();
    token.cancel();
    let fs = FakeFs::new().dir("", vec![d("a")]).dir("a", vec![]);
    let s = scanner(fs, &["_", "_"], 4).with_cancel(token);
    assert!(s.scan().unwrap_err().is_cancelled());
    assert!(s.source().reads().is_empty());
}

#[test]
fn test_cancel_is_not_a_read_error() {
    assert!(ScanError::Cancelled.is_cancelled());
    let read = ScanError::Read {
        path: "x".into(),
        source: io::Error::other("boom"),
    };
    assert!(!read.is_cancelled());
}

// --- pool ---

#[test]
fn test_pool_permit_released_on_drop() {
    let pool = Pool::new(2);
    let token = CancelToken::new();
    let a = pool.acquire(&token).unwrap();
    let _b = pool.acquire(&token).unwrap();
    assert_eq!(pool.available(), 0);
    assert!(pool.try_acquire().is_none());
    drop(a);
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_pool_acquire_cancelled_while_waiting() {
    let pool = Pool::new(1);
    let token = CancelToken::new();
    let held = pool.acquire(&token).unwrap();
    thread::scope(|s| {
        let waiter = s.spawn(|| pool.acquire(&token).map(|_| ()));
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(matches!(waiter.join().unwrap(), Err(ScanError::Cancelled)));
    });
    drop(held);
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_pool_zero_capacity_is_one() {
    assert_eq!(Pool::new(0).capacity(), 1);
}

// --- on disk ---

#[test]
fn test_docs_scenario_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/notes.md"), "n").unwrap();
    std::fs::write(dir.path().join("docs/plan.txt"), "p").unwrap();

    let patterns = parse_patterns(&["^docs$/archive", r".*\.md$/README"]).unwrap();
    let files = Scanner::new(OsDirSource::new(dir.path()), patterns, 4)
        .scan()
        .unwrap();

    let docs = find(&files, "docs");
    assert_eq!((docs.verdict, docs.new_name.as_str()), (Verdict::Matched, "archive"));
    let notes = find(&files, "docs/notes.md");
    assert_eq!((notes.verdict, notes.new_name.as_str()), (Verdict::Matched, "README"));
    assert_eq!(find(&files, "docs/plan.txt").verdict, Verdict::NotMatched);

    let actions: Vec<_> = build_actions(&files)
        .into_iter()
        .map(|a| (a.old_path, a.new_path))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("docs/notes.md".to_string(), "docs/README".to_string()),
            ("docs".to_string(), "archive".to_string()),
        ]
    );
    let omitted: Vec<_> = build_omitted(&files).into_iter().map(|o| o.path).collect();
    assert_eq!(omitted, vec!["docs/plan.txt".to_string()]);
}

#[test]
fn test_os_source_sorts_by_name() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c", "a", "b"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    std::fs::create_dir(dir.path().join("d")).unwrap();
    let items = OsDirSource::new(dir.path()).read_dir(Path::new("")).unwrap();
    assert_eq!(items, vec![f("a"), f("b"), f("c"), d("d")]);
}

#[test]
fn test_os_source_missing_root_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let s = Scanner::new(OsDirSource::new(missing), parse_patterns(&["_"]).unwrap(), 2);
    assert!(matches!(s.scan(), Err(ScanError::Read { .. })));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_directory_is_traversed() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let bad = OsStr::from_bytes(b"bad\xffname");
    std::fs::create_dir(dir.path().join(bad)).unwrap();
    std::fs::write(dir.path().join(bad).join("inner.txt"), "").unwrap();
    std::fs::create_dir(dir.path().join("good")).unwrap();

    let s = Scanner::new(
        OsDirSource::new(dir.path()),
        parse_patterns(&["_", "_"]).unwrap(),
        4,
    );
    let files = s.scan().unwrap();

    assert_eq!(files.len(), 2);
    let node = &files[0];
    assert_eq!(node.name, "bad\u{FFFD}name");
    assert_eq!(node.rel_path.as_os_str(), bad);
    assert_eq!(node.contents.len(), 1);
    assert_eq!(node.contents[0].name, "inner.txt");
    assert_eq!(node.contents[0].rel_path, Path::new(bad).join("inner.txt"));
    assert_eq!(files[1].name, "good");
}
