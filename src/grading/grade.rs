use crate::error::{GradeError, GradeResult};

/// Lower bound (inclusive) and grade point of each bucket, highest first.
static GRADE_SCALE: &[(f64, f64)] = &[
    (90.0, 4.3),
    (85.0, 4.0),
    (80.0, 3.7),
    (77.0, 3.3),
    (73.0, 3.0),
    (70.0, 2.7),
    (67.0, 2.4),
    (63.0, 2.0),
    (60.0, 1.7),
    (50.0, 1.0),
    (0.0, 0.0),
];

/// Converts a composite score (0–100) into a grade point.
///
/// | Range       | Point |
/// |-------------|-------|
/// | >= 90       | 4.3   |
/// | >= 85       | 4.0   |
/// | >= 80       | 3.7   |
/// | >= 77       | 3.3   |
/// | >= 73       | 3.0   |
/// | >= 70       | 2.7   |
/// | >= 67       | 2.4   |
/// | >= 63       | 2.0   |
/// | >= 60       | 1.7   |
/// | >= 50       | 1.0   |
/// | < 50        | 0.0   |
///
/// # Errors
///
/// Returns [`GradeError::OutOfRange`] for scores below 0, above 100, or NaN.
/// Scores are never clamped.
pub fn grade_point(composite: f64) -> GradeResult<f64> {
    if !(0.0..=100.0).contains(&composite) {
        return Err(GradeError::OutOfRange {
            field: "composite_score",
            value: composite,
        });
    }

    let point = GRADE_SCALE
        .iter()
        .find(|(low, _)| composite >= *low)
        .map_or(0.0, |(_, point)| *point);

    Ok(point)
}

/// Every grade point the scale can produce, highest first.
pub fn scale_points() -> impl Iterator<Item = f64> {
    GRADE_SCALE.iter().map(|(_, point)| *point)
}
