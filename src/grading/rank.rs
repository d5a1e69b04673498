//! Competition ranking within partitions.
//!
//! Tied values share the best rank and the next distinct value resumes at
//! `1 + number of strictly better entries`, so `[90, 90, 80]` ranks as
//! `[1, 1, 3]`.

use crate::model::{EnrollmentRecord, ScoreField};
use std::collections::HashMap;

/// Grouping key a rank is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// One course section.
    CourseCode,
    /// Every section sharing a course name.
    CourseName,
}

impl Partition {
    pub fn key(self, record: &EnrollmentRecord) -> &str {
        match self {
            Partition::CourseCode => record.course_code(),
            Partition::CourseName => record.course_name(),
        }
    }
}

/// Which end of the scale is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Highest value ranks first.
    #[default]
    Descending,
    Ascending,
}

/// Ranks every record on `field` within its `partition`.
///
/// The returned vector is aligned with `records`: element `i` is the rank of
/// `records[i]`.
pub fn rank(
    records: &[EnrollmentRecord],
    partition: Partition,
    field: ScoreField,
    direction: Direction,
) -> Vec<u32> {
    let mut ranks = vec![0; records.len()];

    for members in group_indices(records, partition).into_values() {
        let values: Vec<f64> = members.iter().map(|&i| field.value(&records[i])).collect();
        for (&i, r) in members.iter().zip(competition_ranks(&values, direction)) {
            ranks[i] = r;
        }
    }

    ranks
}

/// Number of records sharing each record's partition, aligned with `records`.
pub fn partition_sizes(records: &[EnrollmentRecord], partition: Partition) -> Vec<u32> {
    let mut sizes = vec![0; records.len()];

    for members in group_indices(records, partition).into_values() {
        let size = members.len() as u32;
        for i in members {
            sizes[i] = size;
        }
    }

    sizes
}

/// Competition ranks of a single partition's values, aligned with `values`.
///
/// Values must not be NaN.
pub fn competition_ranks(values: &[f64], direction: Direction) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| match direction {
        Direction::Descending => values[b].total_cmp(&values[a]),
        Direction::Ascending => values[a].total_cmp(&values[b]),
    });

    let mut ranks = vec![0; values.len()];
    let mut current = 0;
    for (pos, &i) in order.iter().enumerate() {
        if pos == 0 || values[i] != values[order[pos - 1]] {
            current = pos as u32 + 1;
        }
        ranks[i] = current;
    }

    ranks
}

fn group_indices(records: &[EnrollmentRecord], partition: Partition) -> HashMap<&str, Vec<usize>> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        groups.entry(partition.key(record)).or_default().push(i);
    }
    groups
}
