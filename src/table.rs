//! The in-memory enrollment table.
//!
//! [`EnrollmentTable`] owns a batch of enrollments and the derived-column
//! lifecycle: columns are computed when the batch is loaded, recomputed for
//! the whole table after every mutation, and stripped by [`EnrollmentTable::serialize`].
//!
//! The table has a single writer. Callers sharing it across threads must
//! serialize mutations externally so each recompute completes before the
//! next mutation starts.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::error::{GradeError, GradeResult};
use crate::grading::composite::composite_score;
use crate::grading::gpa::average_gpa;
use crate::grading::grade::grade_point;
use crate::grading::rank::{Direction, Partition, partition_sizes, rank};
use crate::model::{
    CourseRef, DerivedColumns, EnrollmentRecord, RawEnrollment, ScoreField, ScoreUpdate,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentTable {
    records: Vec<EnrollmentRecord>,
}

impl EnrollmentTable {
    /// Ingests a batch of raw rows and derives every column.
    ///
    /// # Errors
    ///
    /// [`GradeError::MalformedInput`] for an empty identifier, zero credits or
    /// a repeated `(student_id, course_code)` pair; [`GradeError::OutOfRange`]
    /// for a score outside `[0, 100]`. Nothing is ingested on failure.
    pub fn load(rows: Vec<RawEnrollment>) -> GradeResult<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            validate_row(i + 1, row)?;
            if !seen.insert((row.student_id.as_str(), row.course_code.as_str())) {
                return Err(GradeError::malformed(
                    i + 1,
                    format!(
                        "duplicate enrollment of student {} in course {}",
                        row.student_id, row.course_code
                    ),
                ));
            }
        }

        let mut records: Vec<EnrollmentRecord> =
            rows.into_iter().map(EnrollmentRecord::new).collect();
        derive_columns(&mut records)?;

        info!(records = records.len(), "Enrollment table loaded");
        Ok(Self { records })
    }

    /// Overwrites one enrollment's raw scores and recomputes the whole table.
    ///
    /// # Errors
    ///
    /// [`GradeError::NotFound`] if no such enrollment exists and
    /// [`GradeError::OutOfRange`] for a score outside `[0, 100]`. The table is
    /// unchanged on failure.
    pub fn mutate(
        &mut self,
        student_id: &str,
        course_code: &str,
        update: ScoreUpdate,
    ) -> GradeResult<&Self> {
        let Some(index) = self.records.iter().position(|r| r.is(student_id, course_code)) else {
            warn!(student_id, course_code, "Mutation target not found");
            return Err(GradeError::NotFound {
                student_id: student_id.to_string(),
                course_code: course_code.to_string(),
            });
        };

        let mut next = self.records.clone();
        let raw = &mut next[index].raw;
        raw.midterm_score = update.midterm;
        raw.final_score = update.final_exam;
        raw.continuous_score = update.continuous;
        derive_columns(&mut next)?;

        self.records = next;
        info!(
            student_id,
            course_code,
            midterm = update.midterm,
            final_exam = update.final_exam,
            continuous = update.continuous,
            "Scores updated"
        );
        Ok(&*self)
    }

    /// The raw-column view of every record, in load order, for persistence.
    pub fn serialize(&self) -> Vec<RawEnrollment> {
        self.records.iter().map(|r| r.raw.clone()).collect()
    }

    pub fn records(&self) -> &[EnrollmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, student_id: &str, course_code: &str) -> Option<&EnrollmentRecord> {
        self.records.iter().find(|r| r.is(student_id, course_code))
    }

    pub fn by_student<'a>(
        &'a self,
        student_id: &str,
    ) -> impl Iterator<Item = &'a EnrollmentRecord> {
        self.records
            .iter()
            .filter(move |r| r.student_id() == student_id)
    }

    pub fn by_course<'a>(
        &'a self,
        course_code: &str,
    ) -> impl Iterator<Item = &'a EnrollmentRecord> {
        self.records
            .iter()
            .filter(move |r| r.course_code() == course_code)
    }

    /// Records taught by `instructor`, ignoring surrounding whitespace.
    pub fn by_instructor<'a>(
        &'a self,
        instructor: &str,
    ) -> impl Iterator<Item = &'a EnrollmentRecord> {
        let instructor = instructor.trim();
        self.records
            .iter()
            .filter(move |r| r.raw.instructor.trim() == instructor)
    }

    /// Credit-weighted average grade point of a student; 0.0 if not enrolled.
    pub fn average_gpa(&self, student_id: &str) -> f64 {
        average_gpa(self.by_student(student_id))
    }

    /// Distinct courses taught by `instructor`, in first-seen order.
    pub fn courses_taught_by(&self, instructor: &str) -> Vec<CourseRef> {
        distinct_courses(self.by_instructor(instructor))
    }

    /// Distinct courses a student is enrolled in, in first-seen order.
    pub fn courses_for_student(&self, student_id: &str) -> Vec<CourseRef> {
        distinct_courses(self.by_student(student_id))
    }

    /// First record of a section whose student id or name equals `query`.
    pub fn find_in_section(&self, course_code: &str, query: &str) -> Option<&EnrollmentRecord> {
        self.by_course(course_code)
            .find(|r| r.raw.student_id == query || r.raw.student_name == query)
    }

    /// A section's records in the requested order.
    pub fn roster(&self, course_code: &str, order: RosterOrder) -> Vec<&EnrollmentRecord> {
        let mut roster: Vec<&EnrollmentRecord> = self.by_course(course_code).collect();

        match order {
            RosterOrder::Original => {}
            RosterOrder::StudentId => roster.sort_by(|a, b| a.student_id().cmp(b.student_id())),
            RosterOrder::Score(field) => {
                roster.sort_by(|a, b| field.value(b).total_cmp(&field.value(a)))
            }
        }

        roster
    }
}

/// Ordering of a section roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterOrder {
    /// Load order.
    #[default]
    Original,
    /// Ascending student id.
    StudentId,
    /// Descending score, ties kept in load order.
    Score(ScoreField),
}

impl fmt::Display for RosterOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterOrder::Original => f.write_str("original"),
            RosterOrder::StudentId => f.write_str("student-id"),
            RosterOrder::Score(field) => write!(f, "{field}"),
        }
    }
}

impl FromStr for RosterOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(RosterOrder::Original),
            "student-id" | "id" => Ok(RosterOrder::StudentId),
            other => other
                .parse::<ScoreField>()
                .map(RosterOrder::Score)
                .map_err(|_| format!("unknown roster order: {other}")),
        }
    }
}

fn validate_row(row: usize, raw: &RawEnrollment) -> GradeResult<()> {
    for (name, value) in [
        ("student_id", &raw.student_id),
        ("course_code", &raw.course_code),
        ("course_name", &raw.course_name),
    ] {
        if value.trim().is_empty() {
            return Err(GradeError::malformed(row, format!("{name} is empty")));
        }
    }

    if raw.credits == 0 {
        return Err(GradeError::malformed(row, "credits must be positive"));
    }

    Ok(())
}

fn check_score(field: &'static str, value: f64) -> GradeResult<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(GradeError::OutOfRange { field, value })
    }
}

/// Recomputes every derived column of `records` from their raw columns.
///
/// On error `records` may hold partial results; callers derive into a
/// batch they have not yet published.
fn derive_columns(records: &mut [EnrollmentRecord]) -> GradeResult<()> {
    for record in records.iter_mut() {
        let raw = &record.raw;
        let midterm = check_score("midterm_score", raw.midterm_score)?;
        let final_exam = check_score("final_score", raw.final_score)?;
        let continuous = check_score("continuous_score", raw.continuous_score)?;

        let composite = composite_score(midterm, final_exam, continuous);
        record.derived = DerivedColumns {
            composite_score: composite,
            grade_point: grade_point(composite)?,
            ..DerivedColumns::default()
        };
    }

    let snapshot: &[EnrollmentRecord] = records;
    let ranked = |partition: Partition, field: ScoreField| {
        rank(snapshot, partition, field, Direction::Descending)
    };
    let rank_midterm = ranked(Partition::CourseCode, ScoreField::Midterm);
    let rank_final = ranked(Partition::CourseCode, ScoreField::Final);
    let rank_continuous = ranked(Partition::CourseCode, ScoreField::Continuous);
    let rank_composite = ranked(Partition::CourseCode, ScoreField::Composite);
    let gpa_rank = ranked(Partition::CourseName, ScoreField::GradePoint);
    let section_size = partition_sizes(snapshot, Partition::CourseCode);

    for (i, record) in records.iter_mut().enumerate() {
        let derived = &mut record.derived;
        derived.rank_midterm = rank_midterm[i];
        derived.rank_final = rank_final[i];
        derived.rank_continuous = rank_continuous[i];
        derived.rank_composite = rank_composite[i];
        derived.gpa_rank = gpa_rank[i];
        derived.section_size = section_size[i];
    }

    debug!(records = records.len(), "Derived columns recomputed");
    Ok(())
}

fn distinct_courses<'a>(records: impl Iterator<Item = &'a EnrollmentRecord>) -> Vec<CourseRef> {
    let mut seen = HashSet::new();
    records
        .filter(|r| seen.insert(r.course_code()))
        .map(|r| CourseRef {
            course_code: r.raw.course_code.clone(),
            course_name: r.raw.course_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(student: &str, code: &str, scores: (f64, f64, f64), credits: u32) -> RawEnrollment {
        RawEnrollment {
            student_id: student.into(),
            student_name: format!("Name {student}"),
            course_code: code.into(),
            course_name: format!("Course {code}"),
            credits,
            instructor: "Lin".into(),
            midterm_score: scores.0,
            final_score: scores.1,
            continuous_score: scores.2,
        }
    }

    fn update(m: f64, f: f64, c: f64) -> ScoreUpdate {
        ScoreUpdate {
            midterm: m,
            final_exam: f,
            continuous: c,
        }
    }

    #[test]
    fn test_load_two_students() {
        let table = EnrollmentTable::load(vec![
            row("S1", "C1", (90.0, 90.0, 90.0), 3),
            row("S2", "C1", (80.0, 80.0, 80.0), 3),
        ])
        .unwrap();

        let s1 = table.get("S1", "C1").unwrap().derived();
        let s2 = table.get("S2", "C1").unwrap().derived();
        assert_eq!(s1.composite_score, 90.0);
        assert_eq!(s2.composite_score, 80.0);
        assert_eq!(s1.grade_point, 4.3);
        assert_eq!(s2.grade_point, 3.7);
        assert_eq!((s1.rank_composite, s2.rank_composite), (1, 2));
        assert_eq!((s1.section_size, s2.section_size), (2, 2));
    }

    #[test]
    fn test_tied_composites_skip_rank() {
        let table = EnrollmentTable::load(vec![
            row("S1", "C1", (85.0, 85.0, 85.0), 3),
            row("S2", "C1", (85.0, 85.0, 85.0), 3),
            row("S3", "C1", (70.0, 70.0, 70.0), 3),
        ])
        .unwrap();

        let ranks: Vec<u32> = table
            .records()
            .iter()
            .map(|r| r.derived().rank_composite)
            .collect();
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn test_load_rejects_duplicate_identity() {
        let err = EnrollmentTable::load(vec![
            row("S1", "C1", (50.0, 50.0, 50.0), 3),
            row("S1", "C1", (60.0, 60.0, 60.0), 3),
        ])
        .unwrap_err();

        assert!(matches!(err, GradeError::MalformedInput { row: 2, .. }));
    }

    #[test]
    fn test_load_rejects_zero_credits_and_empty_ids() {
        let err = EnrollmentTable::load(vec![row("S1", "C1", (50.0, 50.0, 50.0), 0)]).unwrap_err();
        assert!(matches!(err, GradeError::MalformedInput { row: 1, .. }));

        let err = EnrollmentTable::load(vec![row(" ", "C1", (50.0, 50.0, 50.0), 3)]).unwrap_err();
        assert!(matches!(err, GradeError::MalformedInput { row: 1, .. }));
    }

    #[test]
    fn test_load_rejects_out_of_range_score() {
        let err = EnrollmentTable::load(vec![
            row("S1", "C1", (50.0, 50.0, 50.0), 3),
            row("S2", "C1", (50.0, 101.0, 50.0), 3),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            GradeError::OutOfRange {
                field: "final_score",
                value: 101.0
            }
        );
    }

    #[test]
    fn test_mutate_reranks_other_records() {
        let mut table = EnrollmentTable::load(vec![
            row("S1", "C1", (90.0, 90.0, 90.0), 3),
            row("S2", "C1", (80.0, 80.0, 80.0), 3),
        ])
        .unwrap();

        table.mutate("S2", "C1", update(95.0, 95.0, 95.0)).unwrap();

        assert_eq!(table.get("S1", "C1").unwrap().derived().rank_composite, 2);
        assert_eq!(table.get("S2", "C1").unwrap().derived().rank_composite, 1);
        assert_eq!(table.get("S2", "C1").unwrap().derived().composite_score, 95.0);
    }

    #[test]
    fn test_mutate_updates_gpa_rank_across_sections() {
        let mut s1 = row("S1", "C1-A", (90.0, 90.0, 90.0), 3);
        let mut s2 = row("S2", "C1-B", (60.0, 60.0, 60.0), 3);
        s1.course_name = "Calculus".into();
        s2.course_name = "Calculus".into();
        let mut table = EnrollmentTable::load(vec![s1, s2]).unwrap();
        assert_eq!(table.get("S1", "C1-A").unwrap().derived().gpa_rank, 1);

        table.mutate("S2", "C1-B", update(100.0, 100.0, 100.0)).unwrap();

        let s1 = table.get("S1", "C1-A").unwrap().derived();
        let s2 = table.get("S2", "C1-B").unwrap().derived();
        assert_eq!(s1.gpa_rank, 1);
        assert_eq!(s2.gpa_rank, 1);
        assert_eq!(s1.rank_composite, 1);
        assert_eq!(s1.section_size, 1);
    }

    #[test]
    fn test_mutate_missing_record_leaves_table_unchanged() {
        let mut table = EnrollmentTable::load(vec![row("S1", "C1", (70.0, 70.0, 70.0), 3)]).unwrap();
        let before = table.clone();

        let err = table.mutate("S9", "C1", update(1.0, 1.0, 1.0)).unwrap_err();

        assert!(matches!(err, GradeError::NotFound { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_mutate_out_of_range_is_atomic() {
        let mut table = EnrollmentTable::load(vec![
            row("S1", "C1", (70.0, 70.0, 70.0), 3),
            row("S2", "C1", (60.0, 60.0, 60.0), 3),
        ])
        .unwrap();
        let before = table.clone();

        let err = table.mutate("S2", "C1", update(-5.0, 60.0, 60.0)).unwrap_err();

        assert!(matches!(err, GradeError::OutOfRange { field: "midterm_score", .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_serialize_round_trip_is_stable() {
        let rows = vec![
            row("S1", "C1", (72.5, 64.0, 88.0), 3),
            row("S2", "C1", (72.5, 91.0, 45.0), 3),
            row("S1", "C2", (55.0, 58.0, 61.0), 2),
        ];
        let table = EnrollmentTable::load(rows.clone()).unwrap();

        assert_eq!(table.serialize(), rows);
        let reloaded = EnrollmentTable::load(table.serialize()).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn test_queries() {
        let mut other = row("S2", "C2", (50.0, 50.0, 50.0), 2);
        other.instructor = "  Wu ".into();
        let table = EnrollmentTable::load(vec![
            row("S1", "C1", (90.0, 90.0, 90.0), 3),
            row("S2", "C1", (80.0, 80.0, 80.0), 3),
            other,
        ])
        .unwrap();

        assert_eq!(table.by_student("S2").count(), 2);
        assert_eq!(table.by_course("C1").count(), 2);
        assert_eq!(table.by_instructor("Wu").count(), 1);
        assert_eq!(
            table.courses_taught_by("Lin"),
            vec![CourseRef {
                course_code: "C1".into(),
                course_name: "Course C1".into()
            }]
        );
        assert_eq!(table.courses_for_student("S2").len(), 2);
        assert_eq!(
            table.find_in_section("C1", "Name S2").map(|r| r.student_id()),
            Some("S2")
        );
        assert_eq!(
            table.find_in_section("C1", "S1").map(|r| r.student_id()),
            Some("S1")
        );
        assert!(table.find_in_section("C2", "S1").is_none());
    }

    #[test]
    fn test_average_gpa() {
        let table = EnrollmentTable::load(vec![
            row("S1", "C1", (90.0, 90.0, 90.0), 3),
            row("S1", "C2", (63.0, 63.0, 63.0), 1),
        ])
        .unwrap();

        // (4.3 * 3 + 2.0 * 1) / 4
        assert!((table.average_gpa("S1") - 3.725).abs() < 1e-9);
        assert_eq!(table.average_gpa("nobody"), 0.0);
    }

    #[test]
    fn test_roster_orders() {
        let table = EnrollmentTable::load(vec![
            row("S3", "C1", (60.0, 90.0, 70.0), 3),
            row("S1", "C1", (80.0, 70.0, 70.0), 3),
            row("S2", "C1", (70.0, 80.0, 70.0), 3),
        ])
        .unwrap();

        let ids = |order| -> Vec<&str> {
            table
                .roster("C1", order)
                .into_iter()
                .map(|r| r.student_id())
                .collect()
        };

        assert_eq!(ids(RosterOrder::Original), vec!["S3", "S1", "S2"]);
        assert_eq!(ids(RosterOrder::StudentId), vec!["S1", "S2", "S3"]);
        assert_eq!(ids(RosterOrder::Score(ScoreField::Midterm)), vec!["S1", "S2", "S3"]);
        assert_eq!(ids(RosterOrder::Score(ScoreField::Final)), vec!["S3", "S2", "S1"]);
        // all continuous scores tie, so load order is kept
        assert_eq!(ids(RosterOrder::Score(ScoreField::Continuous)), vec!["S3", "S1", "S2"]);
    }

    #[test]
    fn test_roster_order_parse() {
        assert_eq!("id".parse::<RosterOrder>(), Ok(RosterOrder::StudentId));
        assert_eq!(
            "composite".parse::<RosterOrder>(),
            Ok(RosterOrder::Score(ScoreField::Composite))
        );
        assert_eq!(RosterOrder::Score(ScoreField::Final).to_string(), "final");
        assert!("alphabetical".parse::<RosterOrder>().is_err());
    }
}
