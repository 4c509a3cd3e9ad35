//! Enum types shared by filters and resource records

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Lifecycle state a lookup can match on.
///
/// Serialized as an integer on the wire (`Inactive = 0`, `Active = 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum IsActive {
    Inactive,
    #[default]
    Active,
}

impl IsActive {
    pub fn as_i32(self) -> i32 {
        match self {
            IsActive::Inactive => 0,
            IsActive::Active => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(IsActive::Inactive),
            1 => Some(IsActive::Active),
            _ => None,
        }
    }
}

impl Serialize for IsActive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for IsActive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        IsActive::from_i32(value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid isActive value {}, expected 0 or 1", value))
        })
    }
}

impl fmt::Display for IsActive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsActive::Inactive => write!(f, "Inactive"),
            IsActive::Active => write!(f, "Active"),
        }
    }
}

// ============================================================================
// VISIBILITY
// ============================================================================

/// Who can see a word list, corpus, or model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Invalid Visibility: {}", s)),
        }
    }
}

// ============================================================================
// CORPUS DISCRIMINATOR
// ============================================================================

/// Corpus kind discriminator.
///
/// Raw and logical corpora share a backing table; every corpus lookup carries
/// the constant for its kind so the server can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorpusType {
    Raw,
    Logical,
}

impl CorpusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorpusType::Raw => "RAW",
            CorpusType::Logical => "LOGICAL",
        }
    }
}

impl fmt::Display for CorpusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TOPIC MODEL TREE
// ============================================================================

/// Expansion state of a topic model row in a hierarchical listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreeStatus {
    Collapsed,
    Expanded,
    #[default]
    Disabled,
}

// ============================================================================
// BACKGROUND TASKS
// ============================================================================

/// Queue a background task is tracked in. Used as a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Training,
    Curating,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Training => "training",
            TaskKind::Curating => "curating",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a queued training or curation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    New,
    Pending,
    Completed,
    Error,
    /// A status this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}
