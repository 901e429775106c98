/// Whether `name` is safe to hand to the gist client.
///
/// This is the sole guard against path traversal and against delegating
/// unsafe names upstream, so every file-scoped handler runs it before any
/// network call.
pub fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return false;
    }
    // Hidden files are not addressable through the API.
    if name.starts_with('.') {
        return false;
    }
    name.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}
