//! Grade derivation.
//!
//! Pure functions that turn raw component scores into composite scores,
//! grade points, competition ranks and credit-weighted averages. The
//! enrollment table chains them over a whole batch.

pub mod composite;
pub mod gpa;
pub mod grade;
pub mod rank;
pub mod utility;
