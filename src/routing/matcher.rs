//! Route matching module
//!
//! Routes are an ordered list of (method, path pattern) rules. The first rule
//! that matches wins; when none does, the header lookup catch-all takes the
//! request, and when that is disabled the request falls through to 404.

use hyper::Method;

/// Explicit endpoints of the file API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Root,
    ListFiles,
    ReadFile,
    Upload,
    DeleteFile,
}

/// Path pattern of a route rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Exact path match
    Exact(&'static str),
    /// `<prefix><param>` where the param is a single non-empty segment
    Param { prefix: &'static str },
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub method: Method,
    pub pattern: PathPattern,
    pub kind: RouteKind,
}

/// Outcome of routing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Route {
        kind: RouteKind,
        param: Option<&'a str>,
    },
    HeaderLookup,
    NotFound,
}

/// Ordered route table with a final fallback
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    header_lookup: bool,
}

impl RouteTable {
    /// Route table of the JSON file API
    pub fn file_api(header_lookup: bool) -> Self {
        let rule = |method, pattern, kind| RouteRule {
            method,
            pattern,
            kind,
        };
        Self {
            rules: vec![
                rule(Method::GET, PathPattern::Exact("/"), RouteKind::Root),
                rule(Method::GET, PathPattern::Exact("/files"), RouteKind::ListFiles),
                rule(
                    Method::GET,
                    PathPattern::Param { prefix: "/files/" },
                    RouteKind::ReadFile,
                ),
                rule(Method::POST, PathPattern::Exact("/upload"), RouteKind::Upload),
                rule(
                    Method::DELETE,
                    PathPattern::Param { prefix: "/files/" },
                    RouteKind::DeleteFile,
                ),
            ],
            header_lookup,
        }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Find the endpoint for a request
    pub fn resolve<'a>(&self, method: &Method, path: &'a str) -> Resolved<'a> {
        let path = normalize(path);
        for rule in &self.rules {
            if rule.method != *method {
                continue;
            }
            if let Some(param) = match_pattern(rule.pattern, path) {
                return Resolved::Route {
                    kind: rule.kind,
                    param,
                };
            }
        }

        if self.header_lookup {
            Resolved::HeaderLookup
        } else {
            Resolved::NotFound
        }
    }
}

/// Drop one trailing slash, except for the root path
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Match a path against a pattern, returning the captured param if any
///
/// `None` means no match; `Some(None)` is a match without a param.
#[allow(clippy::option_option)]
fn match_pattern(pattern: PathPattern, path: &str) -> Option<Option<&str>> {
    match pattern {
        PathPattern::Exact(exact) => (path == exact).then_some(None),
        PathPattern::Param { prefix } => {
            let param = path.strip_prefix(prefix)?;
            (!param.is_empty() && !param.contains('/')).then_some(Some(param))
        }
    }
}
