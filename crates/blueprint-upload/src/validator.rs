use blueprint_core::policy::normalize_extension;
use blueprint_core::StoragePolicy;

/// Name used when the declared filename has nothing usable left
const FALLBACK_NAME: &str = "upload";

/// Reasons an upload is refused before any byte is read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionError {
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Declared filename without directories or control characters
    pub name: String,
    /// Lower-case extension with its leading dot
    pub extension: String,
    /// Normalized declared content type, `None` when absent or empty
    pub content_type: Option<String>,
}

/// Check a declared filename and content type against the policy.
///
/// The extension is authoritative. A missing or empty content type is accepted;
/// a declared one must match one of the policy's rules.
pub fn validate(
    filename: &str,
    content_type: Option<&str>,
    policy: &StoragePolicy,
) -> Result<ValidatedUpload, RejectionError> {
    let name = normalize_filename(filename);

    let extension = extract_extension(&name)
        .filter(|ext| policy.allows_extension(ext))
        .ok_or_else(|| {
            RejectionError::UnsupportedExtension(
                extract_extension(&name).unwrap_or_else(|| name.clone()),
            )
        })?;

    let content_type = content_type
        .map(normalize_content_type)
        .filter(|ct| !ct.is_empty());

    if let Some(ref ct) = content_type {
        if !policy.allows_content_type(ct) {
            return Err(RejectionError::UnsupportedContentType(ct.clone()));
        }
    }

    Ok(ValidatedUpload {
        name,
        extension,
        content_type,
    })
}

/// Last path component of the declared name, trimmed and stripped of control
/// characters.
fn normalize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `.dwg` for `plan.DWG`; `None` for `README` or a dotfile such as `.dwg`.
fn extract_extension(name: &str) -> Option<String> {
    let stem_and_ext = name.trim_start_matches('.');
    let dot = stem_and_ext.rfind('.')?;
    normalize_extension(&stem_and_ext[dot + 1..])
}

/// Lower-case MIME type without parameters (`text/plain; charset=utf-8` -> `text/plain`).
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> StoragePolicy {
        StoragePolicy::default()
    }

    #[test]
    fn test_accepts_allowed_extension_and_content_type() {
        let validated = validate("plan.dwg", Some("image/vnd.dwg"), &policy()).unwrap();
        assert_eq!(validated.name, "plan.dwg");
        assert_eq!(validated.extension, ".dwg");
        assert_eq!(validated.content_type.as_deref(), Some("image/vnd.dwg"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let validated = validate("Site Plan.PDF", Some("application/pdf"), &policy()).unwrap();
        assert_eq!(validated.extension, ".pdf");
        assert_eq!(validated.name, "Site Plan.PDF");
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = validate("malware.exe", Some("application/pdf"), &policy()).unwrap_err();
        assert_eq!(err, RejectionError::UnsupportedExtension(".exe".to_string()));
    }

    #[test]
    fn test_rejects_missing_extension() {
        assert!(matches!(
            validate("README", None, &policy()),
            Err(RejectionError::UnsupportedExtension(_))
        ));
        // A dotfile has no extension.
        assert!(matches!(
            validate(".pdf", None, &policy()),
            Err(RejectionError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert!(validate("plan.exe.pdf", None, &policy()).is_ok());
        assert!(validate("plan.pdf.exe", None, &policy()).is_err());
    }

    #[test]
    fn test_missing_or_empty_content_type_is_accepted() {
        let validated = validate("plan.pdf", None, &policy()).unwrap();
        assert_eq!(validated.content_type, None);

        let validated = validate("plan.pdf", Some("  "), &policy()).unwrap();
        assert_eq!(validated.content_type, None);
    }

    #[test]
    fn test_content_type_rules() {
        let p = policy();
        for ct in [
            "application/pdf",
            "image/webp",
            "application/x-dwg",
            "image/x-dxf",
            "application/octet-stream",
            "Application/PDF; charset=binary",
        ] {
            assert!(validate("plan.pdf", Some(ct), &p).is_ok(), "{ct}");
        }

        let err = validate("plan.pdf", Some("text/html"), &p).unwrap_err();
        assert_eq!(
            err,
            RejectionError::UnsupportedContentType("text/html".to_string())
        );
    }

    #[test]
    fn test_strips_directories_and_control_characters() {
        let validated = validate("../../etc/pl\u{0}an.png", None, &policy()).unwrap();
        assert_eq!(validated.name, "plan.png");

        let validated = validate("C:\\drawings\\floor.jpg", None, &policy()).unwrap();
        assert_eq!(validated.name, "floor.jpg");
    }

    #[test]
    fn test_custom_policy() {
        let policy = StoragePolicy::new(["svg"], vec![], 1024);
        assert!(validate("logo.svg", Some("image/svg+xml"), &policy).is_err());
        assert!(validate("logo.svg", None, &policy).is_ok());
        assert!(validate("plan.pdf", None, &policy).is_err());
    }
}
