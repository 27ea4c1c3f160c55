//! Ledger-resident file metadata.
//!
//! Metadata is written once alongside the owner's grant and copied into each
//! share. It is never embedded in the encrypted blob.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, ContentId};

/// Metadata for a file owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Content id of the encrypted blob.
    pub file_id: ContentId,

    /// Original file name.
    pub file_name: String,

    /// MIME type reported at upload.
    pub file_type: String,

    /// Plaintext size in bytes.
    pub file_size: u64,

    /// The account that uploaded the file.
    pub owner: AccountId,

    /// When the ledger accepted the record (Unix milliseconds).
    pub uploaded_at: i64,
}

impl FileMetadata {
    /// Classify the file by its MIME type.
    pub fn category(&self) -> FileCategory {
        FileCategory::from_mime(&self.file_type)
    }

    /// Case-insensitive substring match on the file name.
    ///
    /// An empty query matches everything.
    pub fn matches_name(&self, query: &str) -> bool {
        self.file_name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }
}

/// A file shared with an account, as seen by the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedFile {
    /// Metadata copied from the owner's record at share time.
    pub metadata: FileMetadata,

    /// The account whose secret key sealed the recipient's grant.
    pub shared_by: AccountId,
}

/// Closed file classification used for preview decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileCategory {
    Image,
    Pdf,
    Text,
    Archive,
    Other,
}

const ARCHIVE_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/gzip",
    "application/x-gzip",
    "application/x-tar",
    "application/x-bzip2",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/zstd",
];

impl FileCategory {
    /// Derive the category from a MIME string.
    ///
    /// Parameters (`; charset=...`) and letter case are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence.starts_with("image/") {
            FileCategory::Image
        } else if essence == "application/pdf" {
            FileCategory::Pdf
        } else if essence.starts_with("text/") {
            FileCategory::Text
        } else if ARCHIVE_TYPES.contains(&essence.as_str()) {
            FileCategory::Archive
        } else {
            FileCategory::Other
        }
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Text => "text",
            FileCategory::Archive => "archive",
            FileCategory::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(name: &str, mime: &str) -> FileMetadata {
        FileMetadata {
            file_id: ContentId::new("bafytest").unwrap(),
            file_name: name.to_string(),
            file_type: mime.to_string(),
            file_size: 10,
            owner: AccountId::new("0xowner").unwrap(),
            uploaded_at: 0,
        }
    }

    #[test]
    fn test_category_from_mime() {
        assert_eq!(FileCategory::from_mime("image/png"), FileCategory::Image);
        assert_eq!(FileCategory::from_mime("IMAGE/JPEG"), FileCategory::Image);
        assert_eq!(FileCategory::from_mime("application/pdf"), FileCategory::Pdf);
        assert_eq!(
            FileCategory::from_mime("text/plain; charset=utf-8"),
            FileCategory::Text
        );
        assert_eq!(FileCategory::from_mime("application/zip"), FileCategory::Archive);
        assert_eq!(FileCategory::from_mime("application/x-tar"), FileCategory::Archive);
        assert_eq!(FileCategory::from_mime("video/mp4"), FileCategory::Other);
        assert_eq!(FileCategory::from_mime(""), FileCategory::Other);
    }

    #[test]
    fn test_metadata_category() {
        assert_eq!(metadata("a.pdf", "application/pdf").category(), FileCategory::Pdf);
    }

    #[test]
    fn test_matches_name() {
        let file = metadata("Quarterly Report.PDF", "application/pdf");
        assert!(file.matches_name("report"));
        assert!(file.matches_name("QUARTERLY"));
        assert!(file.matches_name(""));
        assert!(!file.matches_name("invoice"));
    }
}
