//! JSON file service
//!
//! Two small HTTP services over hyper, selected by `server.mode`:
//! - `files`: list, read, upload and delete JSON documents in an upload directory,
//!   plus an `X-FILENAME` header lookup for every other route
//! - `static`: one cached JSON document returned on every route

pub mod config;
pub mod document;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod store;
