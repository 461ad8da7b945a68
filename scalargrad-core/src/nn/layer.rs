use crate::autograd::{Tape, Value};
use crate::error::ScalargradError;
use crate::nn::module::{prefixed, Module};
use crate::nn::neuron::Neuron;
use crate::types::Scalar;
use rand::Rng;
use std::fmt;

/// Result of a layer's forward pass.
///
/// A layer with exactly one neuron yields its value directly (`Single`) instead
/// of a one-element vector, so a final scalar output can be used as-is.
#[derive(Debug, Clone)]
pub enum LayerOutput<T = f64> {
    Single(Value<T>),
    Many(Vec<Value<T>>),
}

impl<T> LayerOutput<T> {
    /// Flattens the output into one value per neuron.
    pub fn into_vec(self) -> Vec<Value<T>> {
        match self {
            LayerOutput::Single(v) => vec![v],
            LayerOutput::Many(vs) => vs,
        }
    }

    /// The value of a single-neuron layer.
    pub fn single(&self) -> Option<&Value<T>> {
        match self {
            LayerOutput::Single(v) => Some(v),
            LayerOutput::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LayerOutput::Single(_) => 1,
            LayerOutput::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row of neurons sharing the same input vector.
#[derive(Debug, Clone)]
pub struct Layer<T = f64> {
    neurons: Vec<Neuron<T>>,
}

impl<T: Scalar> Layer<T> {
    /// Creates `nout` randomly initialised neurons, each taking `nin` inputs.
    ///
    /// # Errors
    /// `ScalargradError::InvalidArchitecture` if `nout` is zero.
    pub fn new(tape: &Tape<T>, nin: usize, nout: usize, nonlin: bool) -> Result<Self, ScalargradError> {
        Self::with_rng(tape, nin, nout, nonlin, &mut rand::thread_rng())
    }

    /// Same as [`Layer::new`] with an explicit random source.
    pub fn with_rng<R: Rng + ?Sized>(
        tape: &Tape<T>,
        nin: usize,
        nout: usize,
        nonlin: bool,
        rng: &mut R,
    ) -> Result<Self, ScalargradError> {
        let neurons = (0..nout)
            .map(|_| Neuron::with_rng(tape, nin, nonlin, rng))
            .collect();
        Self::from_neurons(neurons)
    }

    /// Builds a layer from existing neurons, which must all share one input width.
    pub fn from_neurons(neurons: Vec<Neuron<T>>) -> Result<Self, ScalargradError> {
        let first = neurons.first().ok_or_else(|| {
            ScalargradError::InvalidArchitecture("a layer needs at least one neuron".to_string())
        })?;
        let nin = first.nin();
        if let Some(odd) = neurons.iter().find(|n| n.nin() != nin) {
            return Err(ScalargradError::ShapeMismatch {
                expected: nin,
                actual: odd.nin(),
                operation: "Layer::from_neurons".to_string(),
            });
        }
        log::debug!("built layer {}x{}", nin, neurons.len());
        Ok(Layer { neurons })
    }

    pub fn neurons(&self) -> &[Neuron<T>] {
        &self.neurons
    }

    pub fn nin(&self) -> usize {
        self.neurons.first().map_or(0, Neuron::nin)
    }

    pub fn nout(&self) -> usize {
        self.neurons.len()
    }
}

impl<T: Scalar> Module<T> for Layer<T> {
    type Output = LayerOutput<T>;

    fn forward(&self, inputs: &[Value<T>]) -> Result<LayerOutput<T>, ScalargradError> {
        let mut outputs = self
            .neurons
            .iter()
            .map(|n| n.forward(inputs))
            .collect::<Result<Vec<_>, _>>()?;
        if outputs.len() == 1 {
            if let Some(single) = outputs.pop() {
                return Ok(LayerOutput::Single(single));
            }
        }
        Ok(LayerOutput::Many(outputs))
    }

    fn parameters(&self) -> Vec<Value<T>> {
        self.neurons.iter().flat_map(|n| n.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, Value<T>)> {
        self.neurons
            .iter()
            .enumerate()
            .flat_map(|(i, n)| prefixed(&i.to_string(), n.named_parameters()))
            .collect()
    }
}

impl<T: Scalar> fmt::Display for Layer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neurons: Vec<String> = self.neurons.iter().map(|n| n.to_string()).collect();
        write!(f, "Layer of [{}]", neurons.join(", "))
    }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;
