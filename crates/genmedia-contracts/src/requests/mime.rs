pub const JPEG: &str = "image/jpeg";
pub const PNG: &str = "image/png";
pub const SUPPORTED_MIME_TYPES: [&str; 2] = [JPEG, PNG];

/// Maps a resource path suffix to one of the supported image MIME types.
pub fn infer_mime_type(uri: &str) -> Option<&'static str> {
    let lowered = uri.trim().to_ascii_lowercase();
    let (_, ext) = lowered.rsplit_once('.')?;
    match ext {
        "jpg" | "jpeg" => Some(JPEG),
        "png" => Some(PNG),
        _ => None,
    }
}

/// Normalizes a caller-supplied MIME type; `None` means unsupported.
pub fn normalize_mime_type(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_ascii_lowercase();
    SUPPORTED_MIME_TYPES
        .into_iter()
        .find(|candidate| *candidate == lowered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_known_suffixes() {
        assert_eq!(infer_mime_type("gs://b/cat.jpg"), Some(JPEG));
        assert_eq!(infer_mime_type("gs://b/cat.JPEG"), Some(JPEG));
        assert_eq!(infer_mime_type("gs://b/dir.v2/cat.Png"), Some(PNG));
    }

    #[test]
    fn unknown_or_missing_suffix_is_not_inferred() {
        assert_eq!(infer_mime_type("gs://b/cat.webp"), None);
        assert_eq!(infer_mime_type("gs://b/cat"), None);
        assert_eq!(infer_mime_type("gs://b/cat.png?alt=media"), None);
    }

    #[test]
    fn explicit_types_are_normalized() {
        assert_eq!(normalize_mime_type(" Image/PNG "), Some(PNG));
        assert_eq!(normalize_mime_type("image/jpeg"), Some(JPEG));
        assert_eq!(normalize_mime_type("image/gif"), None);
    }
}
