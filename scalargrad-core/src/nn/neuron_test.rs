use super::*;
use crate::utils::testing::check_grad_near;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_neuron_creation() {
    let tape = Tape::<f64>::new();
    let mut rng = StdRng::seed_from_u64(7);
    let neuron = Neuron::with_rng(&tape, 4, true, &mut rng);
    assert_eq!(neuron.nin(), 4);
    assert!(neuron.is_nonlinear());
    assert_eq!(neuron.bias().data(), 0.0);
    assert!(neuron.weights().iter().all(|w| (-1.0..=1.0).contains(&w.data())));
    assert_eq!(neuron.parameters().len(), 5);
    assert_eq!(tape.len(), 5);
}

#[test]
fn test_linear_neuron_forward_and_backward() -> Result<(), ScalargradError> {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[0.5, -1.0, 2.0], 0.25, false);
    let x = tape.leaves(&[2.0, 3.0, -1.0]);
    let out = neuron.forward(&x)?;
    // 1 - 3 - 2 + 0.25
    assert_relative_eq!(out.data(), -3.75);

    out.backward()?;
    check_grad_near(neuron.weights(), &[2.0, 3.0, -1.0], 1e-12);
    check_grad_near(&x, &[0.5, -1.0, 2.0], 1e-12);
    assert_eq!(neuron.bias().grad(), 1.0);
    Ok(())
}

#[test]
fn test_relu_neuron_clamps_negative_activation() -> Result<(), ScalargradError> {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[0.5, -1.0, 2.0], 0.25, true);
    let x = tape.leaves(&[2.0, 3.0, -1.0]);
    let out = neuron.forward(&x)?;
    assert_eq!(out.data(), 0.0);
    assert_eq!(out.op().to_string(), "ReLU");

    out.backward()?;
    check_grad_near(&neuron.parameters(), &[0.0, 0.0, 0.0, 0.0], 0.0);
    Ok(())
}

#[test]
fn test_forward_records_one_mul_and_one_add_per_input() -> Result<(), ScalargradError> {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[1.0, 2.0, 3.0], 0.5, false);
    let x = tape.leaves(&[1.0, 1.0, 1.0]);
    let before = tape.len();
    let out = neuron.forward(&x)?;
    assert_eq!(tape.len() - before, 6);
    assert_eq!(out.data(), 6.5);
    Ok(())
}

#[test]
fn test_neuron_rejects_wrong_input_count() {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[1.0, 1.0], 0.0, true);
    let x = tape.leaves(&[1.0, 2.0, 3.0]);
    let err = neuron.forward(&x).unwrap_err();
    assert_eq!(
        err,
        ScalargradError::ShapeMismatch {
            expected: 2,
            actual: 3,
            operation: "Neuron::forward".to_string(),
        }
    );
}

#[test]
fn test_neuron_rejects_inputs_from_other_tape() {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[1.0], 0.0, false);
    let other = Tape::new();
    let err = neuron.forward(&other.leaves(&[1.0])).unwrap_err();
    assert!(matches!(err, ScalargradError::TapeMismatch { .. }));
}

#[test]
fn test_zero_input_neuron_returns_bias() -> Result<(), ScalargradError> {
    let tape = Tape::<f64>::new();
    let neuron = Neuron::from_weights(&tape, &[], 1.5, false);
    let out = neuron.forward(&[])?;
    assert_eq!(out.data(), 1.5);
    Ok(())
}

#[test]
fn test_named_parameters_and_display() {
    let tape = Tape::<f64>::new();
    let relu = Neuron::from_weights(&tape, &[1.0, 2.0], 0.0, true);
    let linear = Neuron::from_weights(&tape, &[1.0, 2.0, 3.0], 0.0, false);
    let names: Vec<String> = relu.named_parameters().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["w.0", "w.1", "b"]);
    assert_eq!(relu.to_string(), "ReLUNeuron(2)");
    assert_eq!(linear.to_string(), "LinearNeuron(3)");
}
