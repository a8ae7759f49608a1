//! Content-type resolution for attachment delivery.
//!
//! The MIME type is derived from the lowercased filename extension against a
//! fixed table. Content is never sniffed.

/// Type returned for unknown or missing extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    ("doc", "application/vnd.ms-word"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("csv", "text/csv"),
    ("mp4", "video/mp4"),
];

/// Maps a filename to its MIME type.
///
/// Matching is case-insensitive on the text after the last dot of the final
/// path component, so `.png` counts as a PNG. Anything not in the table
/// resolves to [`DEFAULT_CONTENT_TYPE`].
pub fn resolve(file_name: &str) -> &'static str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let Some((_, ext)) = base.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };
    if ext.is_empty() {
        return DEFAULT_CONTENT_TYPE;
    }
    let ext = ext.to_ascii_lowercase();

    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
