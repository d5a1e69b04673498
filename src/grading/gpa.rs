use crate::model::EnrollmentRecord;

/// Credit-weighted mean grade point over a student's enrollments.
///
/// Returns 0.0 when the enrollments carry no credits at all (including the
/// empty case) rather than failing.
pub fn average_gpa<'a>(records: impl IntoIterator<Item = &'a EnrollmentRecord>) -> f64 {
    let (weighted, credits) = records
        .into_iter()
        .fold((0.0, 0u64), |(weighted, credits), record| {
            let c = record.raw().credits;
            (
                weighted + record.derived().grade_point * c as f64,
                credits + u64::from(c),
            )
        });

    if credits == 0 {
        0.0
    } else {
        weighted / credits as f64
    }
}

/// Sum of credits over a set of enrollments.
pub fn total_credits<'a>(records: impl IntoIterator<Item = &'a EnrollmentRecord>) -> u64 {
    records
        .into_iter()
        .map(|record| u64::from(record.raw().credits))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawEnrollment;

    fn graded(credits: u32, grade_point: f64) -> EnrollmentRecord {
        let mut record = EnrollmentRecord::new(RawEnrollment {
            student_id: "S1".into(),
            student_name: "S1".into(),
            course_code: "C".into(),
            course_name: "Course".into(),
            credits,
            instructor: "T".into(),
            midterm_score: 0.0,
            final_score: 0.0,
            continuous_score: 0.0,
        });
        record.derived.grade_point = grade_point;
        record
    }

    #[test]
    fn test_single_course() {
        let records = [graded(3, 4.0)];
        assert_eq!(average_gpa(&records), 4.0);
    }

    #[test]
    fn test_no_enrollments_is_zero() {
        let records: [EnrollmentRecord; 0] = [];
        assert_eq!(average_gpa(&records), 0.0);
        assert_eq!(total_credits(&records), 0);
    }

    #[test]
    fn test_weighted_by_credits() {
        // (4.3 * 3 + 2.0 * 1) / 4
        let records = [graded(3, 4.3), graded(1, 2.0)];
        assert!((average_gpa(&records) - 3.725).abs() < 1e-9);
        assert_eq!(total_credits(&records), 4);
    }
}
