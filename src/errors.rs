use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Error type that captures engine validation, lookup, and storage failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: Uuid },
    #[error("expense {expense_id} has an unrecognized frequency")]
    UnrecognizedFrequency { expense_id: Uuid },
}

/// Which record family a lookup failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Expense,
    Income,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Expense => write!(f, "expense"),
            RecordKind::Income => write!(f, "income"),
        }
    }
}
