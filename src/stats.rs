use serde::Serialize;

use crate::grading::utility::{mean, median, stddev};
use crate::model::ScoreField;
use crate::table::EnrollmentTable;

/// Number of equal-width histogram bins over `[0, 100]`.
pub const HISTOGRAM_BINS: usize = 10;

/// Distribution of one score field across a course section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub course_code: String,
    pub field: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    /// Counts per bin of width 10; the last bin also holds 100.
    pub histogram: [usize; HISTOGRAM_BINS],
}

impl ScoreSummary {
    /// Summarizes `field` over the section `course_code`.
    ///
    /// Returns `None` if the section has no records.
    pub fn for_section(
        table: &EnrollmentTable,
        course_code: &str,
        field: ScoreField,
    ) -> Option<Self> {
        let values: Vec<f64> = table
            .by_course(course_code)
            .map(|r| field.value(r))
            .collect();
        if values.is_empty() {
            return None;
        }

        let avg = mean(&values);
        Some(ScoreSummary {
            course_code: course_code.to_string(),
            field: field.to_string(),
            count: values.len(),
            mean: avg,
            median: median(&values),
            stddev: stddev(&values, avg),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            histogram: histogram(&values),
        })
    }
}

/// Buckets scores into [`HISTOGRAM_BINS`] bins over `[0, 100]`.
pub fn histogram(values: &[f64]) -> [usize; HISTOGRAM_BINS] {
    let mut bins = [0; HISTOGRAM_BINS];
    let width = 100.0 / HISTOGRAM_BINS as f64;

    for &v in values {
        if !(0.0..=100.0).contains(&v) {
            continue;
        }
        let bin = ((v / width) as usize).min(HISTOGRAM_BINS - 1);
        bins[bin] += 1;
    }

    bins
}
