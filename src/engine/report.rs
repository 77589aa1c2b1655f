//! Console rendering: configuration summary, scanned tree, and executed records.

use anyhow::Result;
use std::io::Write;

use crate::pattern::Pattern;
use crate::pipeline::CancelToken;
use crate::types::{File, Opts, Record, Verdict};
use crate::utils::Colors;

/// Multi-line description of the run configuration, showing `patterns` as compiled.
pub fn config_summary(opts: &Opts, patterns: &[Pattern]) -> String {
    let mut lines = vec![format!("Output File Name Prefix: {}", opts.name_prefix)];
    if let Some(root) = &opts.root {
        lines.push(format!("Base Path (Root): {}", root.display()));
    }
    for (depth, pattern) in patterns.iter().enumerate() {
        match pattern.expression() {
            Some(exp) => lines.push(format!("Depth {depth} Pattern: {exp}")),
            None => lines.push(format!("Depth {depth} Pattern: .*")),
        }
        if let Some(sub) = pattern.substitution() {
            lines.push(format!("Depth {depth} Substitution: {sub}"));
        }
    }
    match (opts.matched, opts.unmatched) {
        (true, true) => {
            lines.push("Show: Both matching and non-matching files and directories".to_string())
        }
        (true, false) => lines.push("Show: Matching files and directories".to_string()),
        (false, true) => lines.push("Show: Non-matching files and directories".to_string()),
        (false, false) => {}
    }
    if opts.verbose {
        lines.push("Verbose Output".to_string());
    }
    lines.push(format!("Concurrency: {}", opts.concurrency));
    if opts.proceed {
        lines.push("Execution Requested".to_string());
    }
    lines.join("\n")
}

/// Whether `file` belongs in a listing filtered by `matched` / `unmatched`.
///
/// Ancestors of a wanted entry are included so the listing keeps its shape.
pub fn should_include(file: &File, matched: bool, unmatched: bool) -> bool {
    (matched && (file.verdict == Verdict::Matched || file.descendants_matched > 0))
        || (unmatched && (file.verdict == Verdict::NotMatched || file.descendants_not_matched > 0))
}

/// One listing line, indented two spaces per depth.
pub fn file_line(file: &File, verbose: bool) -> String {
    let body = if verbose {
        file.verbose_string()
    } else {
        file.to_string()
    };
    let color = match file.verdict {
        Verdict::Matched => Colors::MATCHED,
        Verdict::NotMatched => Colors::NOT_MATCHED,
        Verdict::NoPattern => Colors::NO_PATTERN,
    };
    format!("{}{}", "  ".repeat(file.depth), Colors::colorize(color, &body))
}

/// Print the scanned tree in pre-order. Stops with `Cancelled` if `cancel` fires.
pub fn show_files<W: Write>(
    out: &mut W,
    files: &[File],
    matched: bool,
    unmatched: bool,
    verbose: bool,
    cancel: &CancelToken,
) -> Result<()> {
    for file in files {
        cancel.check()?;
        if should_include(file, matched, unmatched) {
            writeln!(out, "{}", file_line(file, verbose))?;
        }
        show_files(out, &file.contents, matched, unmatched, verbose, cancel)?;
    }
    Ok(())
}

/// Print records as `i: MOVE: a → b` / `i: FAIL: a → b: err`.
pub fn show_results<W: Write>(out: &mut W, records: &[Record], cancel: &CancelToken) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        cancel.check()?;
        let line = format!("{}: {}", i, record);
        if record.succeeded() {
            writeln!(out, "{}", line)?;
        } else {
            writeln!(out, "{}", Colors::colorize(Colors::FAILED, &line))?;
        }
    }
    Ok(())
}
