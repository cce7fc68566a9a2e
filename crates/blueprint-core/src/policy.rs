//! Upload policy
//!
//! The policy is built once at startup and shared read-only by every upload.

use std::collections::BTreeSet;

use serde::Serialize;

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extensions accepted when nothing else is configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".dwg", ".dxf", ".png", ".jpg", ".jpeg"];

/// Content types accepted verbatim when nothing else is configured.
const DEFAULT_EXACT_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/vnd.dwg",
    "image/vnd.dxf",
    "application/acad",
    "application/octet-stream",
];

/// A single content-type matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ContentTypeRule {
    /// Whole MIME type must be equal
    Exact(String),
    /// MIME type must start with the value (e.g. `image/`)
    Prefix(String),
    /// MIME type must contain the value anywhere (CAD markers such as `dxf`)
    Contains(String),
}

impl ContentTypeRule {
    /// Parse a configured pattern.
    ///
    /// `image/*` becomes a prefix rule, `*dxf*` a substring rule, anything else an
    /// exact match. Patterns are lower-cased.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return None;
        }
        if pattern.len() > 2 && pattern.starts_with('*') && pattern.ends_with('*') {
            return Some(ContentTypeRule::Contains(
                pattern[1..pattern.len() - 1].to_string(),
            ));
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            return Some(ContentTypeRule::Prefix(prefix.to_string()));
        }
        Some(ContentTypeRule::Exact(pattern))
    }

    /// `content_type` must already be normalized (lower-case, no parameters).
    pub fn matches(&self, content_type: &str) -> bool {
        match self {
            ContentTypeRule::Exact(value) => content_type == value,
            ContentTypeRule::Prefix(value) => content_type.starts_with(value.as_str()),
            ContentTypeRule::Contains(value) => content_type.contains(value.as_str()),
        }
    }
}

/// Type and size policy applied to every upload.
#[derive(Debug, Clone, Serialize)]
pub struct StoragePolicy {
    allowed_extensions: BTreeSet<String>,
    content_type_rules: Vec<ContentTypeRule>,
    max_size: u64,
}

impl StoragePolicy {
    /// Build a policy. Extensions are lower-cased and given a leading dot.
    pub fn new<I, S>(allowed_extensions: I, content_type_rules: Vec<ContentTypeRule>, max_size: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();

        Self {
            allowed_extensions,
            content_type_rules,
            max_size,
        }
    }

    /// Content-type rules accepted for blueprint uploads: the known PDF/CAD/image
    /// types, any `image/*`, and anything carrying a `dw` or `dxf` marker.
    pub fn default_content_type_rules() -> Vec<ContentTypeRule> {
        let mut rules: Vec<ContentTypeRule> = DEFAULT_EXACT_CONTENT_TYPES
            .iter()
            .map(|ct| ContentTypeRule::Exact((*ct).to_string()))
            .collect();
        rules.push(ContentTypeRule::Prefix("image/".to_string()));
        rules.push(ContentTypeRule::Contains("dw".to_string()));
        rules.push(ContentTypeRule::Contains("dxf".to_string()));
        rules
    }

    /// Replace the size ceiling.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn allowed_extensions(&self) -> impl Iterator<Item = &str> {
        self.allowed_extensions.iter().map(String::as_str)
    }

    pub fn content_type_rules(&self) -> &[ContentTypeRule] {
        &self.content_type_rules
    }

    /// `extension` must be lower-case with its leading dot.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(extension)
    }

    /// `content_type` must be normalized (lower-case, no parameters).
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        self.content_type_rules
            .iter()
            .any(|rule| rule.matches(content_type))
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_EXTENSIONS.iter(),
            Self::default_content_type_rules(),
            DEFAULT_MAX_FILE_SIZE,
        )
    }
}

/// Lower-case an extension and make sure it starts with a single dot.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext))
    }
}
