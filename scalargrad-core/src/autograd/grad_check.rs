use crate::autograd::tape::Tape;
use crate::autograd::value::Value;
use crate::error::ScalargradError;
use crate::types::Scalar;
use approx::relative_eq;
use num_traits::NumCast;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Numerical gradient is NaN or infinite for input {input_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Value {0} cannot be represented in the scalar type under test")]
    Unrepresentable(f64),

    #[error("Function evaluation failed during gradient check: {0}")]
    Engine(#[from] ScalargradError),
}

/// Estimates `d func / d inputs[i]` for every input with central differences.
///
/// Each evaluation records `func` on a fresh tape, so no gradients are touched.
pub fn numerical_gradient<T, F>(func: F, inputs: &[T], epsilon: f64) -> Result<Vec<f64>, GradCheckError>
where
    T: Scalar,
    F: Fn(&[Value<T>]) -> Result<Value<T>, ScalargradError>,
{
    let evaluate = |values: &[T]| -> Result<f64, GradCheckError> {
        let tape = Tape::new();
        let leaves = tape.leaves(values);
        let out = func(&leaves)?;
        Ok(to_f64(out.data()))
    };

    let mut gradient = Vec::with_capacity(inputs.len());
    let mut perturbed = inputs.to_vec();
    for (i, &x) in inputs.iter().enumerate() {
        let x = to_f64(x);
        perturbed[i] = from_f64(x + epsilon)?;
        let loss_plus = evaluate(&perturbed)?;
        perturbed[i] = from_f64(x - epsilon)?;
        let loss_minus = evaluate(&perturbed)?;
        perturbed[i] = inputs[i];

        let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
        if !numerical.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                input_index: i,
                loss_plus,
                loss_minus,
            });
        }
        gradient.push(numerical);
    }
    Ok(gradient)
}

/// Checks analytical gradients against numerical gradients using finite differences.
///
/// `func` maps leaves built from `inputs` to a scalar output. The analytical
/// gradients come from one `backward()` pass; they must agree with the central
/// difference estimate within `tolerance` (absolute or relative).
pub fn check_grad<T, F>(func: F, inputs: &[T], epsilon: f64, tolerance: f64) -> Result<(), GradCheckError>
where
    T: Scalar,
    F: Fn(&[Value<T>]) -> Result<Value<T>, ScalargradError>,
{
    let tape = Tape::new();
    let leaves = tape.leaves(inputs);
    let out = func(&leaves)?;
    out.backward()?;

    let numerical = numerical_gradient(&func, inputs, epsilon)?;
    for (i, (leaf, numerical_grad)) in leaves.iter().zip(numerical).enumerate() {
        let analytical_grad = to_f64(leaf.grad());
        if !relative_eq!(
            analytical_grad,
            numerical_grad,
            epsilon = tolerance,
            max_relative = tolerance
        ) {
            return Err(GradCheckError::GradientMismatch {
                input_index: i,
                analytical_grad,
                numerical_grad,
                difference: (analytical_grad - numerical_grad).abs(),
            });
        }
    }
    log::debug!("check_grad passed for {} inputs", inputs.len());
    Ok(())
}

fn to_f64<T: Scalar>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

fn from_f64<T: Scalar>(x: f64) -> Result<T, GradCheckError> {
    <T as NumCast>::from(x).ok_or(GradCheckError::Unrepresentable(x))
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
