//! Enrollment record types.
//!
//! A record carries two disjoint field sets: the raw columns supplied by the
//! loader and persisted on save, and the derived columns recomputed by the
//! table after every load or mutation. Derived columns are never read from
//! or written to storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw, externally supplied columns of one enrollment.
///
/// Headers from the legacy spreadsheet export are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnrollment {
    #[serde(alias = "學號")]
    pub student_id: String,
    #[serde(alias = "姓名")]
    pub student_name: String,
    #[serde(alias = "課程代碼")]
    pub course_code: String,
    #[serde(alias = "課程名稱")]
    pub course_name: String,
    #[serde(alias = "學分")]
    pub credits: u32,
    #[serde(alias = "教師")]
    pub instructor: String,
    #[serde(alias = "期中考")]
    pub midterm_score: f64,
    #[serde(alias = "期末考")]
    pub final_score: f64,
    #[serde(alias = "平時成績")]
    pub continuous_score: f64,
}

/// Columns derived from the whole table; ranks are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedColumns {
    pub composite_score: f64,
    pub grade_point: f64,
    pub rank_midterm: u32,
    pub rank_final: u32,
    pub rank_continuous: u32,
    pub rank_composite: u32,
    pub section_size: u32,
    pub gpa_rank: u32,
}

/// An enrollment with its derived columns.
///
/// Only the table can construct one or change its contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRecord {
    #[serde(flatten)]
    pub(crate) raw: RawEnrollment,
    #[serde(flatten)]
    pub(crate) derived: DerivedColumns,
}

impl EnrollmentRecord {
    pub(crate) fn new(raw: RawEnrollment) -> Self {
        Self {
            raw,
            derived: DerivedColumns::default(),
        }
    }

    pub fn raw(&self) -> &RawEnrollment {
        &self.raw
    }

    pub fn derived(&self) -> &DerivedColumns {
        &self.derived
    }

    pub fn student_id(&self) -> &str {
        &self.raw.student_id
    }

    pub fn course_code(&self) -> &str {
        &self.raw.course_code
    }

    pub fn course_name(&self) -> &str {
        &self.raw.course_name
    }

    /// Returns true if this record is the enrollment `(student_id, course_code)`.
    pub fn is(&self, student_id: &str, course_code: &str) -> bool {
        self.raw.student_id == student_id && self.raw.course_code == course_code
    }
}

/// A scored dimension of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    Midterm,
    Final,
    Continuous,
    Composite,
    GradePoint,
}

impl ScoreField {
    /// Reads this dimension from a record.
    pub fn value(self, record: &EnrollmentRecord) -> f64 {
        match self {
            ScoreField::Midterm => record.raw.midterm_score,
            ScoreField::Final => record.raw.final_score,
            ScoreField::Continuous => record.raw.continuous_score,
            ScoreField::Composite => record.derived.composite_score,
            ScoreField::GradePoint => record.derived.grade_point,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreField::Midterm => "midterm",
            ScoreField::Final => "final",
            ScoreField::Continuous => "continuous",
            ScoreField::Composite => "composite",
            ScoreField::GradePoint => "grade-point",
        }
    }
}

impl fmt::Display for ScoreField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midterm" => Ok(ScoreField::Midterm),
            "final" => Ok(ScoreField::Final),
            "continuous" => Ok(ScoreField::Continuous),
            "composite" => Ok(ScoreField::Composite),
            "grade-point" | "gpa" => Ok(ScoreField::GradePoint),
            other => Err(format!("unknown score field: {other}")),
        }
    }
}

/// New raw scores for a single enrollment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreUpdate {
    pub midterm: f64,
    pub final_exam: f64,
    pub continuous: f64,
}

/// A `(course_code, course_name)` pair as listed to students and instructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRef {
    pub course_code: String,
    pub course_name: String,
}
