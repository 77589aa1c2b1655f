//! Engine module: everything around the scan (CLI, reporting, TSV output, rename execution)

pub mod arg_parser;
pub mod handlers;
pub mod process;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod tsv;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use handlers::{handle_run, resolve_opts};
pub use process::{Processed, process};
pub use prompt::{prompt, prompt_with};
pub use report::{config_summary, file_line, should_include, show_files, show_results};
pub use tsv::{RecordStream, write_actions, write_omitted, write_record_stream, write_rows};
