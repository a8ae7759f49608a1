//! Attachment entity: one stored binary file owned by exactly one content entity.

use crate::domain::content_type;

/// Longest filename kept after sanitising.
const MAX_FILE_NAME_LEN: usize = 255;

/// Fallback name when nothing usable is left of the uploaded filename.
const DEFAULT_FILE_NAME: &str = "attachment";

/// Attachment metadata without the content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub id: i64,
    /// Owning entity; set at creation and never reassigned.
    pub entity_id: i64,
    pub file_name: String,
    pub size_bytes: i64,
}

impl AttachmentMeta {
    /// MIME type derived from the filename extension only.
    pub fn content_type(&self) -> &'static str {
        content_type::resolve(&self.file_name)
    }
}

/// A stored attachment with its content. Content is immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub meta: AttachmentMeta,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn content_type(&self) -> &'static str {
        self.meta.content_type()
    }
}

/// An uploaded file staged for insertion as part of an entity write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl NewAttachment {
    /// Stages an upload, sanitising the client-supplied filename.
    pub fn new(file_name: &str, content: Vec<u8>) -> Self {
        Self {
            file_name: sanitize_file_name(file_name),
            content,
        }
    }

    pub fn size_bytes(&self) -> i64 {
        self.content.len() as i64
    }
}

/// Reduces a client-supplied filename to a display name.
///
/// The name is never used as a path: directory components (either separator),
/// control characters and surrounding whitespace are removed and the result is
/// capped at 255 characters.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_FILE_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
