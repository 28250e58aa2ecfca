//! Routing module
//!
//! Provides the ordered route table of the file API:
//! - Method + exact path rules
//! - Method + `/prefix/:param` rules
//! - Header lookup catch-all and 404 fallback

mod matcher;

pub use matcher::{PathPattern, Resolved, RouteKind, RouteRule, RouteTable};
