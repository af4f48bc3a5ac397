//! Uploaded document references. Payloads are opaque and never parsed.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Surrogate document id, unique within the owning project.
pub type DocumentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Contracts,
    Plans,
    Invoices,
    Reports,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub filename: String,
    pub mime_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub content: Vec<u8>,
}

/// Caller input for `upload_document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub filename: String,
    pub mime_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: DocumentCategory,
    pub content: Vec<u8>,
}

/// Lookup key for a document inside one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKey {
    Id(DocumentId),
    /// Legacy addressing: first document with this filename and payload.
    Exact { filename: String, content: Vec<u8> },
}

impl DocumentKey {
    pub(crate) fn matches(&self, document: &DocumentRef) -> bool {
        match self {
            Self::Id(id) => document.id == *id,
            Self::Exact { filename, content } => {
                document.filename == *filename && document.content == *content
            }
        }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Exact { filename, content } => {
                write!(f, "`{filename}` ({} bytes)", content.len())
            }
        }
    }
}

impl From<DocumentId> for DocumentKey {
    fn from(value: DocumentId) -> Self {
        Self::Id(value)
    }
}
