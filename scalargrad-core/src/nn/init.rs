use crate::autograd::{Tape, Value};
use crate::types::Scalar;
use rand::Rng;

/// Records `n` leaves drawn uniformly from `[-1, 1]`.
pub fn uniform_symmetric<T, R>(tape: &Tape<T>, n: usize, rng: &mut R) -> Vec<Value<T>>
where
    T: Scalar,
    R: Rng + ?Sized,
{
    (0..n)
        .map(|_| tape.leaf(rng.gen_range(-T::one()..=T::one())))
        .collect()
}

/// Records a leaf holding zero.
pub fn zero<T: Scalar>(tape: &Tape<T>) -> Value<T> {
    tape.leaf(T::zero())
}
