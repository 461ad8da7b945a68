use crate::autograd::Value;
use crate::types::Scalar;
use approx::abs_diff_eq;

/// Checks that the forward values of `actual` match `expected` within `tolerance`.
/// Panics with the offending index otherwise.
pub fn check_data_near<T: Scalar>(actual: &[Value<T>], expected: &[f64], tolerance: f64) {
    let data: Vec<f64> = actual.iter().map(|v| v.data().to_f64().unwrap_or(f64::NAN)).collect();
    check_near("data", &data, expected, tolerance);
}

/// Checks that the gradients of `actual` match `expected` within `tolerance`.
/// Panics with the offending index otherwise.
pub fn check_grad_near<T: Scalar>(actual: &[Value<T>], expected: &[f64], tolerance: f64) {
    let grads: Vec<f64> = actual.iter().map(|v| v.grad().to_f64().unwrap_or(f64::NAN)).collect();
    check_near("grad", &grads, expected, tolerance);
}

fn check_near(what: &str, actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "{} length mismatch", what);

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        if !abs_diff_eq!(*a, *e, epsilon = tolerance) {
            panic!(
                "{} mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                what,
                i,
                a,
                e,
                (a - e).abs(),
                tolerance
            );
        }
    }
}
