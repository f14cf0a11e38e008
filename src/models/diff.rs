use serde::{Deserialize, Serialize};

/// Classification of a diff span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Present only in the "after" text
    Added,
    /// Present only in the "before" text
    Removed,
    /// Present in both texts
    Unchanged,
}

/// A contiguous run of text with a single classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub kind: DiffKind,
    pub value: String,
}

impl DiffSpan {
    pub fn added(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Added,
            value: value.into(),
        }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Removed,
            value: value.into(),
        }
    }

    pub fn unchanged(value: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Unchanged,
            value: value.into(),
        }
    }

    /// Whether this span is part of the "before" text
    pub fn in_before(&self) -> bool {
        self.kind != DiffKind::Added
    }

    /// Whether this span is part of the "after" text
    pub fn in_after(&self) -> bool {
        self.kind != DiffKind::Removed
    }
}

/// Word counts per span kind (whitespace runs are not counted)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}
