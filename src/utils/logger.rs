use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the global logger. Dependencies log at Warn; this crate at Info, or Debug when verbose.
/// Safe to call more than once (later calls are ignored).
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                }
                _ => format!("[{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}

/// Console colors for scan listings and summaries.
pub struct Colors;

impl Colors {
    pub const MATCHED: &'static str = "green";
    pub const NOT_MATCHED: &'static str = "yellow";
    pub const NO_PATTERN: &'static str = "bright black";
    pub const FAILED: &'static str = "red";

    pub fn colorize(color: &str, text: &str) -> String {
        text.color(color).to_string()
    }
}
