//! core type-safe wrappers around store primitives for the gateway layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// media type all documents are stored under
pub const MEDIA_TYPE: &str = "text/markdown";

/// Server-assigned identifier of a document record.
///
/// This makes sure we don't accidentally pass a list index where a record ID
/// is expected. Assigned by the record store on insert, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

impl DocumentId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated storage key.
///
/// Keys address blobs in the object store and double as relative paths in the
/// filesystem backend, so they are restricted to prevent path traversal and
/// ensure filesystem compatibility.
///
/// Valid keys:
/// - 1-512 characters
/// - no empty segments, no leading `/`
/// - no `.` or `..` segments
/// - no control characters or backslashes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageKey(String);

impl StorageKey {
    /// create a new StorageKey, validating the input
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidKeyError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Generate a fresh key for a named document.
    ///
    /// Format: `{ulid}/{file_name}`; the random token guarantees global
    /// uniqueness while the suffix keeps the key human-readable. Unsafe
    /// characters in the file name are replaced so the result always
    /// validates.
    pub fn generate(file_name: &str) -> Self {
        let token = ulid::Ulid::new().to_string().to_lowercase();
        let suffix = Self::sanitize_file_name(file_name);
        Self(format!("{}/{}", token, suffix))
    }

    fn sanitize_file_name(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| {
                if c.is_control() || c == '/' || c == '\\' {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let trimmed = cleaned.trim_matches('.').trim();
        if trimmed.is_empty() {
            "untitled".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Validate a storage key.
    fn validate(key: &str) -> Result<(), InvalidKeyError> {
        if key.is_empty() {
            return Err(InvalidKeyError::Empty);
        }

        if key.len() > 512 {
            return Err(InvalidKeyError::TooLong(key.len()));
        }

        if key.starts_with('/') {
            return Err(InvalidKeyError::Absolute(key.to_string()));
        }

        for segment in key.split('/') {
            if segment.is_empty() {
                return Err(InvalidKeyError::EmptySegment(key.to_string()));
            }
            if segment == "." || segment == ".." {
                return Err(InvalidKeyError::Traversal(key.to_string()));
            }
        }

        for (i, c) in key.chars().enumerate() {
            if c.is_control() || c == '\\' {
                return Err(InvalidKeyError::InvalidCharacter { char: c, position: i });
            }
        }

        Ok(())
    }

    /// get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StorageKey {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

/// error type for invalid storage keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidKeyError {
    Empty,
    TooLong(usize),
    Absolute(String),
    EmptySegment(String),
    Traversal(String),
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for InvalidKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "key cannot be empty"),
            Self::TooLong(len) => write!(f, "key too long: {} characters", len),
            Self::Absolute(key) => write!(f, "key cannot be absolute: '{}'", key),
            Self::EmptySegment(key) => write!(f, "key has an empty segment: '{}'", key),
            Self::Traversal(key) => write!(f, "key contains a traversal segment: '{}'", key),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character {:?} at position {}", char, position)
            }
        }
    }
}

impl std::error::Error for InvalidKeyError {}

/// A document's metadata row in the record store.
///
/// The record store is the system of record for this entity; the id is
/// assigned on insert and immutable, the storage path is assigned at creation
/// and immutable in the common path, only the name mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub storage_path: StorageKey,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Read-projection of a record used by the list cache and the navigator.
///
/// Ordering of a list of entries is server-defined (insertion order) and is
/// the ordering next/previous navigation relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentListEntry {
    pub id: DocumentId,
    pub name: String,
    pub storage_path: StorageKey,
}

impl From<&DocumentRecord> for DocumentListEntry {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            storage_path: record.storage_path.clone(),
        }
    }
}

/// A file handed to the batch upload operation: a display name plus a byte
/// payload, typically read straight from disk.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Mutable fields of a record, for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub name: Option<String>,
}

impl RecordPatch {
    /// patch that renames the record
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
