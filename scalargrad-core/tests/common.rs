use scalargrad_core::{Tape, Value};
use std::sync::Once;

static INIT: Once = Once::new();

// Attempt to initialize env_logger. If it fails (e.g., already initialized), that's okay.
#[allow(dead_code)]
pub fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Scenario 1 expression: uses x through many paths.
#[allow(dead_code)]
pub fn sanity_expr(x: &Value<f64>) -> Value<f64> {
    let z = x * 2.0 + 2.0 + x;
    let q = z.relu() + &z * x;
    let h = (&z * &z).relu();
    h + &q + &q * x
}

/// Scenario 2 expression over two leaves, exercising every operation.
#[allow(dead_code)]
pub fn more_ops_expr(a: &Value<f64>, b: &Value<f64>) -> Value<f64> {
    let c = a + b;
    let d = a * b + b.pow(3.0);
    let c = &c + (&c + 1.0);
    let c = &c + (&c + 1.0 + &c + -a);
    let d = &d + (&d * 2.0 + (b + a).relu());
    let d = &d + (&d + (&d * 3.0 + (b - a).relu()));
    let e = &c - &d;
    let f = e.pow(2.0);
    let g = &f / 2.0;
    g + a / &f
}

#[allow(dead_code)]
pub fn fresh_leaves(values: &[f64]) -> (Tape<f64>, Vec<Value<f64>>) {
    let tape = Tape::new();
    let leaves = tape.leaves(values);
    (tape, leaves)
}
