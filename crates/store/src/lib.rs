use async_trait::async_trait;
use model::{Error, StudentRecord, StudentUpdate};
use std::fmt::{Debug, Display, Formatter};

/// Persist student records keyed by `student_id`.
///
/// Each operation touches exactly one record and relies on the backing
/// store for atomicity.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Write the record, replacing any existing record with the same id.
    async fn put_student(&self, record: StudentRecord) -> Result<(), StoreError>;

    /// Absence is not an error.
    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, StoreError>;

    /// Apply the supplied fields to an existing record and return the result.
    /// Fails with `MissingEntry` if there is no record to update.
    async fn update_student(
        &self,
        student_id: &str,
        update: StudentUpdate,
    ) -> Result<StudentRecord, StoreError>;

    /// Remove the record, returning it if it existed.
    async fn delete_student(&self, student_id: &str)
        -> Result<Option<StudentRecord>, StoreError>;
}

/// Errors arising from the store.
#[derive(Debug)]
pub struct StoreError {
    pub student_id: String,

    pub operation: StoreOperation,
    pub reason: StoreErrorReason,
}

#[derive(Debug)]
pub enum StoreErrorReason {
    // An expected record was missing.
    MissingEntry,
    // The record couldn't be converted to or from the stored form
    BadRecord(String),
    // An error from the underlying store
    BackendFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    PutStudent,
    GetStudent,
    UpdateStudent,
    DeleteStudent,
}

impl StoreError {
    pub fn new(student_id: String, operation: StoreOperation, reason: StoreErrorReason) -> Self {
        StoreError {
            student_id,
            operation,
            reason,
        }
    }

    pub fn is_missing_entry(&self) -> bool {
        matches!(self.reason, StoreErrorReason::MissingEntry)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason: String = match &self.reason {
            StoreErrorReason::MissingEntry => "missing entry".to_string(),
            StoreErrorReason::BadRecord(msg) => format!("bad record: {msg}"),
            StoreErrorReason::BackendFailure(err) => format!("backend failure: {err}"),
        };

        write!(
            f,
            "{:?} failed for student {}: {}",
            self.operation, self.student_id, reason
        )
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            StoreErrorReason::BackendFailure(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
