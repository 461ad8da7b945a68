use crate::autograd::{Tape, Value};
use crate::error::ScalargradError;
use crate::nn::init;
use crate::nn::module::Module;
use crate::types::Scalar;
use rand::Rng;
use std::fmt;

/// A single unit computing `relu(sum(w_i * x_i) + b)`, or the bare affine sum
/// when `nonlin` is `false`.
#[derive(Debug, Clone)]
pub struct Neuron<T = f64> {
    weights: Vec<Value<T>>,
    bias: Value<T>,
    nonlin: bool,
}

impl<T: Scalar> Neuron<T> {
    /// Creates a neuron with `nin` weights drawn from `[-1, 1]` and a zero bias,
    /// all recorded on `tape`.
    pub fn new(tape: &Tape<T>, nin: usize, nonlin: bool) -> Self {
        Self::with_rng(tape, nin, nonlin, &mut rand::thread_rng())
    }

    /// Same as [`Neuron::new`] with an explicit random source.
    pub fn with_rng<R: Rng + ?Sized>(tape: &Tape<T>, nin: usize, nonlin: bool, rng: &mut R) -> Self {
        Neuron {
            weights: init::uniform_symmetric(tape, nin, rng),
            bias: init::zero(tape),
            nonlin,
        }
    }

    /// Creates a neuron from known weights and bias.
    pub fn from_weights(tape: &Tape<T>, weights: &[T], bias: T, nonlin: bool) -> Self {
        Neuron {
            weights: tape.leaves(weights),
            bias: tape.leaf(bias),
            nonlin,
        }
    }

    pub fn weights(&self) -> &[Value<T>] {
        &self.weights
    }

    pub fn bias(&self) -> &Value<T> {
        &self.bias
    }

    /// Number of inputs the neuron expects.
    pub fn nin(&self) -> usize {
        self.weights.len()
    }

    pub fn is_nonlinear(&self) -> bool {
        self.nonlin
    }
}

impl<T: Scalar> Module<T> for Neuron<T> {
    type Output = Value<T>;

    fn forward(&self, inputs: &[Value<T>]) -> Result<Value<T>, ScalargradError> {
        if inputs.len() != self.weights.len() {
            return Err(ScalargradError::ShapeMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
                operation: "Neuron::forward".to_string(),
            });
        }
        let tape = self.bias.tape();
        if inputs.iter().any(|x| !x.tape().same_tape(tape)) {
            return Err(ScalargradError::TapeMismatch {
                operation: "Neuron::forward".to_string(),
            });
        }

        let act = self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.bias.clone(), |acc, (w, x)| acc + w * x);
        Ok(if self.nonlin { act.relu() } else { act })
    }

    fn parameters(&self) -> Vec<Value<T>> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }

    fn named_parameters(&self) -> Vec<(String, Value<T>)> {
        let mut named: Vec<(String, Value<T>)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, w)| (format!("w.{}", i), w.clone()))
            .collect();
        named.push(("b".to_string(), self.bias.clone()));
        named
    }
}

impl<T: Scalar> fmt::Display for Neuron<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.nonlin { "ReLU" } else { "Linear" };
        write!(f, "{}Neuron({})", kind, self.weights.len())
    }
}

#[cfg(test)]
#[path = "neuron_test.rs"]
mod tests;
