//! Scanning core: cancellation, bounded read pool, directory sources, and the ordered walker.

pub mod cancel;
pub mod pool;
pub mod scanner;
pub mod source;

pub use cancel::CancelToken;
pub use pool::{Permit, Pool};
pub use scanner::{LOOKAHEAD, Scanner, new_file};
pub use source::{DirItem, DirSource, OsDirSource};
