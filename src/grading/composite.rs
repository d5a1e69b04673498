/// Weights of midterm, final and continuous assessment, in tenths (0.3/0.3/0.4).
///
/// Carrying them as whole tenths keeps the weighted sum of integral scores
/// exact, so equal composites compare equal when ranking.
const WEIGHTS_TENTHS: [f64; 3] = [3.0, 3.0, 4.0];

/// Computes the composite score of three raw components.
///
/// The result is rounded to 2 decimal places, half away from zero. The
/// function is total over the reals; range checks belong to the caller.
pub fn composite_score(midterm: f64, final_exam: f64, continuous: f64) -> f64 {
    let [w_mid, w_final, w_cont] = WEIGHTS_TENTHS;
    let tenths = midterm * w_mid + final_exam * w_final + continuous * w_cont;

    // tenths * 10 is the composite in hundredths
    (tenths * 10.0).round() / 100.0
}
