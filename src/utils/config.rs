//! Application configuration constants.
//! Defaults and output naming in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!("{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Optional settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Upper-case package name, used in the debug config dump.
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }
}

// ---- Scanning ----

/// Concurrent directory reads when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 32;

// ---- Output files ----

/// Prefix for the proposed/omitted/results TSV files when none is configured.
pub const DEFAULT_NAME_PREFIX: &str = "migration";

/// Timestamp appended to output file names (local time, no characters that need quoting on Windows).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Which TSV file is being written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Proposed,
    Omitted,
    Results,
}

impl OutputKind {
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Proposed => "proposed",
            OutputKind::Omitted => "omitted",
            OutputKind::Results => "results",
        }
    }
}

/// `<prefix>-<kind> <timestamp>.tsv`
pub fn output_filename(prefix: &str, kind: OutputKind, timestamp: &str) -> String {
    format!("{prefix}-{} {timestamp}.tsv", kind.label())
}

/// Current local time formatted with [`TIMESTAMP_FORMAT`].
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
