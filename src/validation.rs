/// Whether the data starts with the signature of a known image format.
pub fn is_valid_image(data: &[u8]) -> bool {
    infer::is_image(data)
}

/// Extension of an uploaded file name, including the dot.
///
/// Anything other than a short ASCII alphanumeric extension is dropped so the
/// result is always safe to use in a stored file name.
pub fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Guess the content type of stored data.
pub fn mime_type(data: &[u8]) -> &'static str {
    infer::get(data)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream")
}
