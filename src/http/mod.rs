//! HTTP protocol layer module
//!
//! Response builders and header constants shared by the file API and the static responder.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_options_response, json_response, raw_json_response, Cors, FILENAME_HEADER,
    JSON_CONTENT_TYPE,
};
