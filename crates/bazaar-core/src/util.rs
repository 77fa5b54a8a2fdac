//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trim `value` and reject it when nothing is left.
pub fn required_text(value: &str, what: &str) -> crate::Result<String> {
    normalize_text_option(Some(value.to_string()))
        .ok_or_else(|| crate::Error::InvalidInput(format!("{what} is required")))
}

/// Check if a string starts with `http://`, `https://` or `memory://`.
pub fn is_blob_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://") || value.starts_with("memory://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some("  Vintage lamp ".to_string())),
            Some("Vintage lamp".to_string())
        );
    }

    #[test]
    fn required_text_names_the_missing_field() {
        let err = required_text(" \n", "Comment").unwrap_err();
        assert!(err.to_string().contains("Comment is required"));
    }

    #[test]
    fn is_blob_url_accepts_known_schemes() {
        assert!(is_blob_url("https://cdn.example.com"));
        assert!(is_blob_url("memory://bucket"));
        assert!(!is_blob_url("ftp://example.com"));
    }
}
