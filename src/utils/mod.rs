pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod renamer_toml;

pub use config::*;
pub use fd_limit::{cap_concurrency, max_open_fds, max_reads_by_fd_limit};
pub use logger::{Colors, setup_logging};
