use clap::Parser;
use std::path::PathBuf;

const ABOUT: &str = "Searches for and optionally renames files according to regular expression patterns.";

const LONG_ABOUT: &str = "Searches for and optionally renames files according to regular expression patterns. \
It matches file and directory names as it traverses a file system from a given root. \
Successive patterns match successive traversal depths.\n\n\
Proposed rename actions, omitted (non-matching) files and the results of actions taken are written to TSV files for review.\n\n\
Directories are scanned concurrently for speed. Renames happen in series for safety.";

/// Depth-indexed pattern renamer.
///
/// Every option can also come from the environment or from `renamer.toml` in the working
/// directory; the command line wins.
#[derive(Clone, Debug, Parser)]
#[command(name = "renamer", version)]
#[command(about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Regular expression patterns, one per depth, with optional substitution after a forward slash (exp/sub). `_` matches anything.
    #[arg(value_name = "PATTERN", env = "PATTERN")]
    pub patterns: Vec<String>,

    /// Output file name prefix.
    #[arg(long = "name", short = 'n', env = "NAME")]
    pub name_prefix: Option<String>,

    /// Root path of the directory structure.
    #[arg(long, short = 'r', env = "ROOT")]
    pub root: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', env = "VERBOSE", num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Show matching files and directories.
    #[arg(long, short = 'm', env = "MATCHED", num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub matched: Option<bool>,

    /// Show non-matching files and directories.
    #[arg(long, short = 'u', env = "UNMATCHED", num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub unmatched: Option<bool>,

    /// Maximum number of concurrent directory reads during scanning. Default: 32.
    #[arg(long, short = 'c', env = "CONCURRENCY", value_parser = clap::value_parser!(usize))]
    pub concurrency: Option<usize>,

    /// Proceed with renaming (asks for confirmation first).
    #[arg(long, env = "PROCEED", num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub proceed: Option<bool>,
}
