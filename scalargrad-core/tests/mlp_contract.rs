use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use scalargrad_core::autograd::grad_check::{check_grad, GradCheckError};
use scalargrad_core::nn::{zero_grad, LayerOutput, Mlp, Module};
use scalargrad_core::{ScalargradError, Tape, Value};

mod common;
use common::setup;

/// Squared error of a scalar-head MLP over a tiny dataset.
fn squared_error(
    tape: &Tape<f64>,
    mlp: &Mlp<f64>,
    samples: &[([f64; 2], f64)],
) -> Result<Value<f64>, ScalargradError> {
    let mut loss = tape.leaf(0.0);
    for (x, target) in samples {
        let prediction = match mlp.forward(&tape.leaves(x))? {
            LayerOutput::Single(v) => v,
            LayerOutput::Many(_) => {
                return Err(ScalargradError::InvalidArchitecture("expected a scalar head".to_string()))
            }
        };
        loss = loss + (prediction - *target).pow(2.0);
    }
    Ok(loss)
}

const SAMPLES: [([f64; 2], f64); 3] = [([0.5, -1.0], 1.0), ([2.0, 0.25], -1.0), ([-1.5, 1.0], 0.5)];

#[test]
fn test_zero_grad_then_backward_reproduces_gradients() -> Result<(), ScalargradError> {
    setup();
    let tape = Tape::<f64>::new();
    let mlp = Mlp::with_rng(&tape, 2, &[4, 4, 1], &mut StdRng::seed_from_u64(2024))?;

    squared_error(&tape, &mlp, &SAMPLES)?.backward()?;
    let first: Vec<f64> = mlp.parameters().iter().map(Value::grad).collect();
    assert!(first.iter().any(|g| *g != 0.0));

    mlp.zero_grad();
    assert!(mlp.parameters().iter().all(|p| p.grad() == 0.0));

    squared_error(&tape, &mlp, &SAMPLES)?.backward()?;
    let second: Vec<f64> = mlp.parameters().iter().map(Value::grad).collect();
    for (a, b) in first.iter().zip(&second) {
        assert_relative_eq!(*a, *b);
    }
    Ok(())
}

#[test]
fn test_gradients_accumulate_without_zero_grad() -> Result<(), ScalargradError> {
    setup();
    let tape = Tape::<f64>::new();
    let mlp = Mlp::with_rng(&tape, 2, &[3, 1], &mut StdRng::seed_from_u64(7))?;
    let params = mlp.parameters();

    squared_error(&tape, &mlp, &SAMPLES)?.backward()?;
    let once: Vec<f64> = params.iter().map(Value::grad).collect();
    squared_error(&tape, &mlp, &SAMPLES)?.backward()?;
    for (p, g) in params.iter().zip(&once) {
        assert_relative_eq!(p.grad(), 2.0 * g, epsilon = 1e-12);
    }

    zero_grad(&params);
    assert!(params.iter().all(|p| p.grad() == 0.0));
    Ok(())
}

#[test]
fn test_mlp_input_gradients_match_finite_differences() -> Result<(), GradCheckError> {
    setup();
    check_grad(
        |xs: &[Value<f64>]| {
            let mlp = Mlp::with_rng(xs[0].tape(), 3, &[5, 1], &mut StdRng::seed_from_u64(31))?;
            let out = mlp.forward(xs)?.into_vec();
            Ok(&out[0] * &out[0])
        },
        &[0.3, -0.8, 1.1],
        1e-6,
        1e-5,
    )
}

#[test]
fn test_vector_head_feeds_a_caller_defined_loss() -> Result<(), ScalargradError> {
    setup();
    let tape = Tape::<f64>::new();
    let mlp = Mlp::with_rng(&tape, 2, &[3, 2], &mut StdRng::seed_from_u64(5))?;
    let outputs = mlp.forward(&tape.leaves(&[1.0, -2.0]))?.into_vec();
    assert_eq!(outputs.len(), 2);

    let loss = &outputs[0] - &outputs[1];
    loss.backward()?;
    // The last layer is linear: d loss / d bias = +1 and -1
    let last = &mlp.layers()[1];
    assert_eq!(last.neurons()[0].bias().grad(), 1.0);
    assert_eq!(last.neurons()[1].bias().grad(), -1.0);
    Ok(())
}

#[test]
fn test_truncating_after_each_step_bounds_the_tape() -> Result<(), ScalargradError> {
    setup();
    let tape = Tape::<f64>::new();
    let mlp = Mlp::with_rng(&tape, 2, &[4, 1], &mut StdRng::seed_from_u64(99))?;
    let params = mlp.parameters();
    assert_eq!(params.len(), 17);
    let mark = tape.mark();
    assert_eq!(tape.len(), 17);

    let mut first: Option<Vec<f64>> = None;
    for step in 0..1000 {
        mlp.zero_grad();
        squared_error(&tape, &mlp, &SAMPLES)?.backward()?;
        let grads: Vec<f64> = params.iter().map(Value::grad).collect();
        match &first {
            Some(expected) => assert_eq!(&grads, expected, "step {}", step),
            None => first = Some(grads),
        }
        tape.truncate(mark)?;
        assert_eq!(tape.len(), 17, "step {}", step);
    }
    assert!(params.iter().all(Value::is_live));
    Ok(())
}
