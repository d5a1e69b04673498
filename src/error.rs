//! Error taxonomy for the grading engine.

use thiserror::Error;

/// Grading result type
pub type GradeResult<T> = Result<T, GradeError>;

/// Errors raised while ingesting, deriving or mutating enrollment records.
///
/// All of them are recoverable by the caller. A failed `load` ingests
/// nothing and a failed `mutate` leaves the table untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradeError {
    /// A required raw field is missing, empty or mistyped, or an identity repeats.
    #[error("Malformed input at row {row}: {reason}")]
    MalformedInput { row: usize, reason: String },

    /// No enrollment exists for the given identity.
    #[error("No enrollment for student {student_id} in course {course_code}")]
    NotFound {
        student_id: String,
        course_code: String,
    },

    /// A score fell outside `[0, 100]` (or was not a number).
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl GradeError {
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        GradeError::MalformedInput {
            row,
            reason: reason.into(),
        }
    }
}
