pub mod error;
pub mod grading;
pub mod model;
pub mod output;
pub mod parser;
pub mod report;
pub mod stats;
pub mod table;

pub use error::{GradeError, GradeResult};
pub use model::{EnrollmentRecord, RawEnrollment, ScoreField, ScoreUpdate};
pub use table::{EnrollmentTable, RosterOrder};
