use crate::autograd::{Tape, Value};
use crate::error::ScalargradError;
use crate::nn::layer::{Layer, LayerOutput};
use crate::nn::module::{prefixed, Module};
use crate::types::Scalar;
use rand::Rng;
use std::fmt;

/// Multi-layer perceptron: layers chained input to output.
///
/// Every layer except the last applies ReLU; the last layer is linear.
#[derive(Debug, Clone)]
pub struct Mlp<T = f64> {
    layers: Vec<Layer<T>>,
}

impl<T: Scalar> Mlp<T> {
    /// Creates an MLP taking `nin` inputs with one layer per entry of `nouts`.
    ///
    /// # Errors
    /// `ScalargradError::InvalidArchitecture` if `nouts` is empty or contains a zero width.
    pub fn new(tape: &Tape<T>, nin: usize, nouts: &[usize]) -> Result<Self, ScalargradError> {
        Self::with_rng(tape, nin, nouts, &mut rand::thread_rng())
    }

    /// Same as [`Mlp::new`] with an explicit random source.
    pub fn with_rng<R: Rng + ?Sized>(
        tape: &Tape<T>,
        nin: usize,
        nouts: &[usize],
        rng: &mut R,
    ) -> Result<Self, ScalargradError> {
        if nouts.is_empty() {
            return Err(ScalargradError::InvalidArchitecture(
                "an MLP needs at least one layer".to_string(),
            ));
        }
        let mut layers = Vec::with_capacity(nouts.len());
        let mut width = nin;
        for (i, &nout) in nouts.iter().enumerate() {
            let nonlin = i + 1 != nouts.len();
            layers.push(Layer::with_rng(tape, width, nout, nonlin, rng)?);
            width = nout;
        }
        log::debug!("built MLP {} -> {:?}", nin, nouts);
        Ok(Mlp { layers })
    }

    /// Chains existing layers; each layer's input width must equal the previous layer's output width.
    pub fn from_layers(layers: Vec<Layer<T>>) -> Result<Self, ScalargradError> {
        if layers.is_empty() {
            return Err(ScalargradError::InvalidArchitecture(
                "an MLP needs at least one layer".to_string(),
            ));
        }
        for pair in layers.windows(2) {
            if pair[1].nin() != pair[0].nout() {
                return Err(ScalargradError::ShapeMismatch {
                    expected: pair[0].nout(),
                    actual: pair[1].nin(),
                    operation: "Mlp::from_layers".to_string(),
                });
            }
        }
        Ok(Mlp { layers })
    }

    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    pub fn nin(&self) -> usize {
        self.layers.first().map_or(0, Layer::nin)
    }

    pub fn nout(&self) -> usize {
        self.layers.last().map_or(0, Layer::nout)
    }
}

impl<T: Scalar> Module<T> for Mlp<T> {
    type Output = LayerOutput<T>;

    fn forward(&self, inputs: &[Value<T>]) -> Result<LayerOutput<T>, ScalargradError> {
        let (last, hidden) = self.layers.split_last().ok_or_else(|| {
            ScalargradError::InvalidArchitecture("an MLP needs at least one layer".to_string())
        })?;
        let mut activations = inputs.to_vec();
        for layer in hidden {
            activations = layer.forward(&activations)?.into_vec();
        }
        last.forward(&activations)
    }

    fn parameters(&self) -> Vec<Value<T>> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, Value<T>)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(i, l)| prefixed(&i.to_string(), l.named_parameters()))
            .collect()
    }
}

impl<T: Scalar> fmt::Display for Mlp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<String> = self.layers.iter().map(|l| l.to_string()).collect();
        write!(f, "MLP of [{}]", layers.join(", "))
    }
}

#[cfg(test)]
#[path = "mlp_test.rs"]
mod tests;
