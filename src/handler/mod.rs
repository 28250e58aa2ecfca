//! Request handler module
//!
//! Responsible for request routing dispatch and business logic processing:
//! the JSON file API (files mode) and the cached document responder (static mode).

pub mod files;
pub mod router;
pub mod static_doc;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
