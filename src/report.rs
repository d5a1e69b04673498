//! Serializable views handed to presentation layers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::grading::gpa::{average_gpa, total_credits};
use crate::model::EnrollmentRecord;
use crate::table::EnrollmentTable;

/// One student's enrollments with their credit-weighted average.
#[derive(Debug, Serialize)]
pub struct Transcript<'a> {
    pub student_id: String,
    pub student_name: String,
    pub total_credits: u64,
    pub average_gpa: f64,
    pub courses: Vec<&'a EnrollmentRecord>,
}

impl<'a> Transcript<'a> {
    /// Builds the transcript of `student_id`, or `None` if they have no enrollments.
    pub fn for_student(table: &'a EnrollmentTable, student_id: &str) -> Option<Self> {
        let courses: Vec<&EnrollmentRecord> = table.by_student(student_id).collect();
        let first = courses.first()?;

        Some(Transcript {
            student_id: first.student_id().to_string(),
            student_name: first.raw().student_name.clone(),
            total_credits: total_credits(courses.iter().copied()),
            average_gpa: average_gpa(courses.iter().copied()),
            courses,
        })
    }
}

/// Per-student summary line of a [`GpaReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentGpa {
    pub student_id: String,
    pub student_name: String,
    pub total_credits: u64,
    pub average_gpa: f64,
}

/// Average GPA of every student in the table, sorted by student id.
#[derive(Debug, Serialize)]
pub struct GpaReport {
    pub generated_at: DateTime<Utc>,
    pub students: Vec<StudentGpa>,
}

impl GpaReport {
    pub fn from_table(table: &EnrollmentTable) -> Self {
        let mut by_student: BTreeMap<&str, Vec<&EnrollmentRecord>> = BTreeMap::new();
        for record in table.records() {
            by_student.entry(record.student_id()).or_default().push(record);
        }

        let students = by_student
            .into_iter()
            .map(|(student_id, records)| StudentGpa {
                student_id: student_id.to_string(),
                student_name: records[0].raw().student_name.clone(),
                total_credits: total_credits(records.iter().copied()),
                average_gpa: average_gpa(records.iter().copied()),
            })
            .collect();

        GpaReport {
            generated_at: Utc::now(),
            students,
        }
    }
}
