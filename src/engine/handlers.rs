//! CLI command handler: scan, report, propose; with --proceed, confirm and rename.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::engine::arg_parser::Cli;
use crate::engine::process::process;
use crate::engine::progress::{create_counter, finish_bar, scan_observer};
use crate::engine::prompt::prompt;
use crate::engine::report::{config_summary, show_files, show_results};
use crate::engine::tsv::{write_actions, write_omitted, write_record_stream};
use crate::error::ScanError;
use crate::pattern::{Pattern, parse_patterns};
use crate::pipeline::{CancelToken, OsDirSource, Scanner};
use crate::plan::{build_actions, build_omitted};
use crate::types::{File, Opts, Summary, pluralize};
use crate::utils::config::{OutputKind, PackagePaths, current_timestamp, output_filename};
use crate::utils::renamer_toml::{apply_file_to_opts, load_renamer_toml};
use crate::utils::{cap_concurrency, setup_logging};

/// Overwrite opts field from the command line when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(v) = $cli.$cli_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Defaults, then `renamer.toml` from `config_dir`, then CLI/environment.
/// Fails when the settings file exists but cannot be read or parsed.
pub fn resolve_opts(cli: &Cli, config_dir: &Path) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_renamer_toml(config_dir)? {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_opt!(cli, opts, name_prefix => name_prefix);
    if let Some(ref root) = cli.root {
        opts.root = Some(root.clone());
    }
    if !cli.patterns.is_empty() {
        opts.patterns = cli.patterns.clone();
    }
    apply_cli_opt!(cli, opts, verbose => verbose);
    apply_cli_opt!(cli, opts, matched => matched);
    apply_cli_opt!(cli, opts, unmatched => unmatched);
    apply_cli_opt!(cli, opts, concurrency => concurrency);
    apply_cli_opt!(cli, opts, proceed => proceed);
    Ok(opts)
}

fn require_root(opts: &Opts) -> Result<PathBuf> {
    let Some(root) = opts.root.clone() else {
        bail!("no root given (use --root, ROOT, or root in renamer.toml)");
    };
    if opts.concurrency == 0 {
        bail!("concurrency must be at least 1");
    }
    Ok(root)
}

/// Cancel token fired by Ctrl+C / SIGTERM.
fn install_cancel_handler() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("set Ctrl+C handler")?;
    Ok(cancel)
}

fn is_cancellation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ScanError>()
        .is_some_and(ScanError::is_cancelled)
}

/// Scan `root` on the local file system, showing a counter when verbose.
fn scan(
    root: &Path,
    opts: &Opts,
    patterns: Vec<Pattern>,
    cancel: &CancelToken,
) -> Result<Vec<File>> {
    let concurrency = cap_concurrency(opts.concurrency);
    let scanner = Scanner::new(OsDirSource::new(root), patterns, concurrency)
        .with_cancel(cancel.clone());

    let bar = opts.verbose.then(|| create_counter("Scanning"));
    let result = scanner.scan_with(scan_observer(&bar));
    if let Some(bar) = &bar {
        finish_bar(bar);
    }
    Ok(result?)
}

/// Run the whole flow for `cli`.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("determine working directory")?;
    let opts = resolve_opts(cli, &cwd).context("invalid configuration")?;
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", PackagePaths::get().env_prefix(), opts);

    // Patterns are validated before anything touches the tree.
    let patterns = parse_patterns(&opts.patterns).context("invalid pattern")?;
    let root = require_root(&opts)?;
    println!("{}", config_summary(&opts, &patterns));

    let cancel = install_cancel_handler()?;

    println!("Scanning directories and files...");
    let scan_start = Instant::now();
    let files = match scan(&root, &opts, patterns, &cancel) {
        Ok(files) => files,
        Err(e) if is_cancellation(&e) => {
            println!(
                "Scanning directories and files... stopped. ({:?})",
                scan_start.elapsed()
            );
            return Err(e.context("operation cancelled"));
        }
        Err(e) => return Err(e.context("scanning directories and files failed")),
    };
    println!(
        "Scanning directories and files... done. ({:?})",
        scan_start.elapsed()
    );

    if opts.matched || opts.unmatched {
        let stdout = std::io::stdout();
        show_files(
            &mut stdout.lock(),
            &files,
            opts.matched,
            opts.unmatched,
            opts.verbose,
            &cancel,
        )
        .context("failed to display results")?;
    }

    let actions = build_actions(&files);
    if actions.is_empty() {
        println!("No actions proposed.");
        return Ok(());
    }
    let omitted = build_omitted(&files);

    let proposed_file = output_filename(&opts.name_prefix, OutputKind::Proposed, &current_timestamp());
    write_actions(Path::new(&proposed_file), &actions)?;
    info!("Wrote proposed actions to {}", proposed_file);

    let omitted_file = output_filename(&opts.name_prefix, OutputKind::Omitted, &current_timestamp());
    write_omitted(Path::new(&omitted_file), &omitted)?;
    info!("Wrote omitted entries to {}", omitted_file);

    let actions_count = pluralize(actions.len(), "action", "actions");
    println!("{} proposed.", actions_count);

    if !opts.proceed {
        return Ok(());
    }

    let items_count = pluralize(actions.len(), "item", "items");
    let confirmed = prompt(&format!(
        "Proceed with rename actions affecting {}?",
        items_count
    ))
    .context("cancelling due to unexpected response")?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    let results_file = output_filename(&opts.name_prefix, OutputKind::Results, &current_timestamp());
    let stream = write_record_stream(Path::new(&results_file))
        .with_context(|| format!("failed to prepare output file {}", results_file))?;
    info!("Progressively writing results to {}", stream.path.display());

    println!(
        "Proceeding with the proposed {}, unto whatever end.",
        actions_count
    );
    let process_start = Instant::now();
    let processed = process(&root, &actions, &cancel, Some(&stream.tx));
    let process_duration = process_start.elapsed();
    let write_result = stream.finish();

    let summary = Summary::from_records(&processed.records);
    if let Err(e) = write_result {
        warn!("Failed to write results to file ({e:#}). Writing results to console as a last resort.");
        let stdout = std::io::stdout();
        show_results(&mut stdout.lock(), &processed.records, &CancelToken::new())?;
    }
    if let Some(e) = processed.interrupted {
        println!("{} Stopped after {:?}.", summary, process_duration);
        return Err(e).context("renaming interrupted");
    }
    println!("{} Done. ({:?})", summary, process_duration);
    Ok(())
}
