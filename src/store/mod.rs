//! JSON document store
//!
//! A flat directory of `.json` files keyed by file name. No locking: concurrent
//! writers to the same name race and the last one wins.

mod files;
mod name;

pub use files::{format_timestamp, FileEntry, FileStore};
pub use name::{sanitize_file_name, validate_json_name, JsonFileName, NameRejection, JSON_EXTENSION};
