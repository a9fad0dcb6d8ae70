use mongodb::error::{ErrorKind, WriteFailure};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::services::seeder::{SeedStage, SeedStep};

// Server error codes the seeder cares about.
pub const CODE_UNAUTHORIZED: i32 = 13;
pub const CODE_AUTHENTICATION_FAILED: i32 = 18;
pub const CODE_ALREADY_INITIALIZED: i32 = 23;
pub const CODE_NAMESPACE_EXISTS: i32 = 48;
pub const CODE_DUPLICATE_KEY: i32 = 11000;
pub const CODE_USER_EXISTS: i32 = 51003;

/// Coarse classification of a driver failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    AlreadyExists,
    AuthFailed,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::AlreadyExists => write!(f, "already exists"),
            FailureKind::AuthFailed => write!(f, "authentication failed"),
            FailureKind::Other => write!(f, "error"),
        }
    }
}

impl FailureKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            CODE_ALREADY_INITIALIZED | CODE_NAMESPACE_EXISTS | CODE_DUPLICATE_KEY | CODE_USER_EXISTS => {
                FailureKind::AlreadyExists
            }
            CODE_AUTHENTICATION_FAILED | CODE_UNAUTHORIZED => FailureKind::AuthFailed,
            _ => FailureKind::Other,
        }
    }

    /// Classify a driver error. Bulk inserts count as already-exists only
    /// when every write error is a duplicate key.
    pub fn classify(err: &mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Authentication { .. } => FailureKind::AuthFailed,
            ErrorKind::Command(command) => Self::from_code(command.code),
            ErrorKind::Write(WriteFailure::WriteError(write)) => Self::from_code(write.code),
            ErrorKind::InsertMany(_) => match Self::insert_write_codes(err) {
                Some(codes) => Self::from_codes(&codes),
                None => FailureKind::Other,
            },
            _ => FailureKind::Other,
        }
    }

    /// Per-document error codes of a bulk insert, or `None` for any other
    /// failure (including a write concern error).
    pub fn insert_write_codes(err: &mongodb::error::Error) -> Option<Vec<i32>> {
        match err.kind.as_ref() {
            ErrorKind::InsertMany(insert) if insert.write_concern_error.is_none() => Some(
                insert
                    .write_errors
                    .iter()
                    .flatten()
                    .map(|failure| failure.code)
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Number of documents a bulk insert wrote past duplicate keys, when
    /// duplicates were its only write errors.
    pub fn inserted_past_duplicates(attempted: usize, codes: &[i32]) -> Option<usize> {
        match Self::from_codes(codes) {
            FailureKind::AlreadyExists => Some(attempted.saturating_sub(codes.len())),
            _ => None,
        }
    }

    pub fn from_codes(codes: &[i32]) -> Self {
        if !codes.is_empty() && codes.iter().all(|&c| c == CODE_DUPLICATE_KEY) {
            FailureKind::AlreadyExists
        } else {
            FailureKind::Other
        }
    }
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("{step} failed after reaching {stage} ({kind}): {source}")]
    Step {
        step: SeedStep,
        stage: SeedStage,
        kind: FailureKind,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("{step} failed after reaching {stage}: no writable primary within {timeout:?}")]
    NotReady {
        step: SeedStep,
        stage: SeedStage,
        timeout: Duration,
    },
    #[error("{step} failed after reaching {stage}: session is not authenticated as '{username}'")]
    NotAuthenticated {
        step: SeedStep,
        stage: SeedStage,
        username: String,
    },
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl SeedError {
    pub fn step(step: SeedStep, stage: SeedStage, source: mongodb::error::Error) -> Self {
        SeedError::Step {
            step,
            stage,
            kind: FailureKind::classify(&source),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SeedError::Step { kind, .. } => *kind,
            SeedError::NotAuthenticated { .. } => FailureKind::AuthFailed,
            SeedError::Database(e) => FailureKind::classify(e),
            _ => FailureKind::Other,
        }
    }

    pub fn failed_step(&self) -> Option<SeedStep> {
        match self {
            SeedError::Step { step, .. }
            | SeedError::NotReady { step, .. }
            | SeedError::NotAuthenticated { step, .. } => Some(*step),
            SeedError::Database(_) => None,
        }
    }

    /// Last stage the run completed before failing.
    pub fn reached_stage(&self) -> Option<SeedStage> {
        match self {
            SeedError::Step { stage, .. }
            | SeedError::NotReady { stage, .. }
            | SeedError::NotAuthenticated { stage, .. } => Some(*stage),
            SeedError::Database(_) => None,
        }
    }
}
