use std::path::Path;

/// Name to declare for `file`: the explicit override, else the file's own name.
pub fn declared_name(file: &Path, name: Option<&str>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Content type to declare: the explicit one, else a guess from the name.
///
/// Returns `None` when nothing can be guessed, which the pipeline accepts.
pub fn declared_content_type(name: &str, explicit: Option<String>) -> Option<String> {
    explicit.or_else(|| {
        mime_guess::from_path(name)
            .first()
            .map(|mime| mime.essence_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_name_prefers_override() {
        let file = Path::new("/tmp/scans/IMG_001.png");
        assert_eq!(declared_name(file, None), "IMG_001.png");
        assert_eq!(declared_name(file, Some("site.png")), "site.png");
    }

    #[test]
    fn content_type_guessed_from_name() {
        assert_eq!(
            declared_content_type("plan.pdf", None).as_deref(),
            Some("application/pdf")
        );
        assert_eq!(
            declared_content_type("photo.JPG", None).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(declared_content_type("noext", None), None);
    }

    #[test]
    fn explicit_content_type_wins() {
        assert_eq!(
            declared_content_type("plan.dwg", Some("image/vnd.dwg".to_string())).as_deref(),
            Some("image/vnd.dwg")
        );
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
