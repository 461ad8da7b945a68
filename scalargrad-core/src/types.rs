use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use std::fmt::{Debug, Display};
use std::ops::AddAssign;

/// Element type stored in every node of the graph.
///
/// Blanket-implemented for any floating point type that can be accumulated in
/// place and sampled uniformly, which in practice means `f32` and `f64`.
pub trait Scalar: Float + AddAssign + SampleUniform + Debug + Display + 'static {}

impl<T> Scalar for T where T: Float + AddAssign + SampleUniform + Debug + Display + 'static {}
