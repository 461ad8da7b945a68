use crate::autograd::Value;
use crate::error::ScalargradError;
use crate::types::Scalar;

/// The base trait for all neural network modules (neurons, layers, containers).
///
/// A module maps a sequence of scalar inputs to its `Output` by recording
/// operations on the inputs' tape, and exposes its learnable parameters.
pub trait Module<T: Scalar>: std::fmt::Debug {
    /// What a forward pass produces (a single value, or one value per neuron).
    type Output;

    /// Performs a forward pass of the module.
    ///
    /// # Errors
    /// Returns `ScalargradError::ShapeMismatch` when `inputs.len()` differs from
    /// the module's input width, and `ScalargradError::TapeMismatch` when the
    /// inputs were recorded on a different tape than the parameters.
    fn forward(&self, inputs: &[Value<T>]) -> Result<Self::Output, ScalargradError>;

    /// Returns all learnable parameters, children first-to-last in construction order.
    fn parameters(&self) -> Vec<Value<T>>;

    /// Returns the parameters along with hierarchical names (e.g. `"1.0.w.2"`).
    /// The order matches [`Module::parameters`].
    fn named_parameters(&self) -> Vec<(String, Value<T>)>;

    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// Resets the gradient of every parameter to zero.
    fn zero_grad(&self) {
        zero_grad(&self.parameters());
    }
}

/// Sets `grad = 0` on every value in `parameters`.
pub fn zero_grad<T: Scalar>(parameters: &[Value<T>]) {
    for param in parameters {
        param.zero_grad();
    }
}

/// Prefixes each parameter name with `prefix.`; used by container modules.
pub(crate) fn prefixed<T>(prefix: &str, named: Vec<(String, Value<T>)>) -> Vec<(String, Value<T>)> {
    named
        .into_iter()
        .map(|(name, param)| (format!("{}.{}", prefix, name), param))
        .collect()
}

#[cfg(test)]
#[path = "module_test.rs"]
mod tests;
