//! # Services
//!
//! Pattern search and the capabilities the editor borrows from its host.

pub mod host;
pub mod search;

pub use host::{
    expand_path, ExternalRunner, FileSystem, Host, LocalFileSystem, MemoryHost, ProcessRunner,
};
pub use search::{find_matching_bracket, SearchEngine, SearchHit, SearchScope};
