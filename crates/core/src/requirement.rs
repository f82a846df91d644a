//! Requirement domain types.
//!
//! A requirement is a unit of natural-language intent. It is stored as an
//! ordered set of chunks; each chunk carries a [`ChunkPayload`] next to its
//! embedding so a similarity hit can be traced back to its requirement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::store::FieldMap;

/// Requirement category: a requirement proper or a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Req,
    Def,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Req => "Req",
            Category::Def => "Def",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Exact match only: "req" or "REQ" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Req" => Ok(Category::Req),
            "Def" => Ok(Category::Def),
            other => Err(ValidationError::InvalidCategory(other.to_string())),
        }
    }
}

/// A stored requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Identifier; empty until assigned by the repository.
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub category: Category,
}

impl Requirement {
    /// A requirement with no id yet.
    pub fn new(content: impl Into<String>, category: Category) -> Self {
        Self {
            id: String::new(),
            content: content.into(),
            category,
        }
    }

    /// A requirement with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, content: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            category,
        }
    }
}

/// One chunk of a requirement's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementChunk {
    pub requirement_id: String,
    pub chunk_index: usize,
    pub category: Category,
    pub chunk_text: String,
}

impl RequirementChunk {
    /// Metadata to store next to this chunk's embedding.
    pub fn payload(&self) -> ChunkPayload {
        ChunkPayload {
            requirement_id: self.requirement_id.clone(),
            chunk_index: self.chunk_index,
            category: self.category,
            chunk_text: self.chunk_text.clone(),
        }
    }

    /// Fields of the flat chunk record, in write order.
    pub fn record_fields(&self) -> [(&'static str, String); 4] {
        [
            ("id", self.requirement_id.clone()),
            ("chunkIndex", self.chunk_index.to_string()),
            ("content", self.chunk_text.clone()),
            ("category", self.category.to_string()),
        ]
    }
}

/// Metadata stored alongside each chunk embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPayload {
    pub requirement_id: String,
    pub chunk_index: usize,
    pub category: Category,
    pub chunk_text: String,
}

impl ChunkPayload {
    pub const REQUIREMENT_ID: &'static str = "requirementId";
    pub const CHUNK_INDEX: &'static str = "chunkIndex";
    pub const CATEGORY: &'static str = "category";
    pub const CHUNK_TEXT: &'static str = "chunkText";

    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(Self::REQUIREMENT_ID.into(), self.requirement_id.clone());
        fields.insert(Self::CHUNK_INDEX.into(), self.chunk_index.to_string());
        fields.insert(Self::CATEGORY.into(), self.category.to_string());
        fields.insert(Self::CHUNK_TEXT.into(), self.chunk_text.clone());
        fields
    }

    /// Lenient decode: returns `None` if any field is missing or malformed.
    pub fn from_fields(fields: &FieldMap) -> Option<Self> {
        Some(Self {
            requirement_id: fields.get(Self::REQUIREMENT_ID)?.clone(),
            chunk_index: fields.get(Self::CHUNK_INDEX)?.parse().ok()?,
            category: fields.get(Self::CATEGORY)?.parse().ok()?,
            chunk_text: fields.get(Self::CHUNK_TEXT)?.clone(),
        })
    }
}
