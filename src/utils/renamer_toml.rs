//! Load `renamer.toml` from the working directory (CLI only). Lib callers pass [`ScanOpts`](crate::ScanOpts).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RenamerToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    name: Option<String>,
    root: Option<String>,
    patterns: Option<Vec<String>>,
    verbose: Option<bool>,
    matched: Option<bool>,
    unmatched: Option<bool>,
    concurrency: Option<usize>,
    proceed: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no such file; a file that
/// cannot be read or parsed is an error.
pub(crate) fn load_renamer_toml(dir: &Path) -> Result<Option<RenamerToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let file = parse_renamer_toml(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

pub(crate) fn parse_renamer_toml(s: &str) -> Result<RenamerToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &RenamerToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, name => name_prefix);
    if let Some(ref root) = s.root {
        opts.root = Some(PathBuf::from(root));
    }
    apply_file_opt!(s, opts, patterns => patterns);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, matched => matched);
    apply_file_opt!(s, opts, unmatched => unmatched);
    apply_file_opt!(s, opts, concurrency => concurrency);
    apply_file_opt!(s, opts, proceed => proceed);
}
