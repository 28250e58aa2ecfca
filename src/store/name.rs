//! File name validation and sanitization
//!
//! Every route that takes a file name goes through [`validate_json_name`];
//! uploads go through [`sanitize_file_name`] first.

use std::fmt;

/// Extension every stored document must carry
pub const JSON_EXTENSION: &str = ".json";

/// A file name that passed validation and is safe to join onto the upload directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonFileName(String);

impl JsonFileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JsonFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JsonFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    Empty,
    NotJson,
    PathTraversal,
}

impl NameRejection {
    /// Short reason reported in the `message` field of an error envelope
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Empty => "文件名不能为空",
            Self::NotJson => "文件名必须以.json结尾",
            Self::PathTraversal => "文件名不能包含路径",
        }
    }
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Validate a client-supplied file name
///
/// # Examples
/// ```
/// use json_file_service::store::{validate_json_name, NameRejection};
/// assert_eq!(validate_json_name("a.json").unwrap().as_str(), "a.json");
/// assert_eq!(validate_json_name("a.txt"), Err(NameRejection::NotJson));
/// ```
pub fn validate_json_name(name: &str) -> Result<JsonFileName, NameRejection> {
    if name.is_empty() {
        return Err(NameRejection::Empty);
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(NameRejection::PathTraversal);
    }
    if !name.ends_with(JSON_EXTENSION) {
        return Err(NameRejection::NotJson);
    }
    Ok(JsonFileName(name.to_string()))
}

/// Replace every character outside `[A-Za-z0-9.]` with `_`
pub fn sanitize_file_name(original: &str) -> String {
    original
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_json_names() {
        assert_eq!(validate_json_name("a.json").unwrap().as_str(), "a.json");
        assert_eq!(
            validate_json_name("report_2024.v2.json").unwrap().to_string(),
            "report_2024.v2.json"
        );
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert_eq!(validate_json_name("a.txt"), Err(NameRejection::NotJson));
        assert_eq!(validate_json_name("a.json.bak"), Err(NameRejection::NotJson));
        assert_eq!(validate_json_name("a.JSON"), Err(NameRejection::NotJson));
    }

    #[test]
    fn test_rejects_empty_and_paths() {
        assert_eq!(validate_json_name(""), Err(NameRejection::Empty));
        assert_eq!(validate_json_name("   "), Err(NameRejection::NotJson));
        assert_eq!(
            validate_json_name("../secret.json"),
            Err(NameRejection::PathTraversal)
        );
        assert_eq!(
            validate_json_name("dir\\a.json"),
            Err(NameRejection::PathTraversal)
        );
        assert_eq!(validate_json_name(".."), Err(NameRejection::PathTraversal));
    }

    #[test]
    fn test_names_kept_verbatim() {
        assert_eq!(validate_json_name(" a.json").unwrap().as_str(), " a.json");
        assert_eq!(validate_json_name("a.json ").unwrap_err(), NameRejection::NotJson);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_name("a.json"), "a.json");
        assert_eq!(sanitize_file_name("my data (1).json"), "my_data__1_.json");
        assert_eq!(sanitize_file_name("../etc/x.json"), ".._etc_x.json");
        assert_eq!(sanitize_file_name("数据.json"), "__.json");
    }

    #[test]
    fn test_sanitized_names_never_escape() {
        for raw in ["../../a.json", "/abs/path.json", "c:\\w\\x.json"] {
            let name = validate_json_name(&sanitize_file_name(raw)).unwrap();
            assert!(!name.as_str().contains('/'));
            assert!(!name.as_str().contains('\\'));
        }
    }
}
