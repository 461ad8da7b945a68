//! # Scalar MLP walkthrough
//!
//! Builds a small expression and a `2 -> 4 -> 4 -> 1` MLP on a tape, runs a
//! few backward passes through a squared-error loss, truncating the tape back
//! to the parameters after each one, and prints the gradients a training loop
//! would consume.
//!
//! ## Execution
//! `RUST_LOG=debug cargo run --example scalar_mlp`

use rand::rngs::StdRng;
use rand::SeedableRng;
use scalargrad_core::nn::{LayerOutput, Mlp, Module};
use scalargrad_core::{ScalargradError, Tape};

fn main() -> Result<(), ScalargradError> {
    env_logger::init();

    // --- Plain expression ---
    let tape = Tape::<f64>::new();
    let a = tape.leaf(-4.0);
    let b = tape.leaf(2.0);
    let c = (&a * &b + b.pow(3.0)).relu() - &a / 2.0;
    c.backward()?;
    println!("c = {}", c);
    println!("dc/da = {:.4}, dc/db = {:.4}", a.grad(), b.grad());

    // --- MLP ---
    let tape = Tape::<f64>::new();
    let mut rng = StdRng::seed_from_u64(1337);
    let mlp = Mlp::with_rng(&tape, 2, &[4, 4, 1], &mut rng)?;
    println!("{}", mlp);
    println!("{} parameters", mlp.num_parameters());

    // Everything recorded after this point belongs to one step
    let mark = tape.mark();
    let samples = [([2.0, 3.0], 1.0), ([3.0, -1.0], -1.0), ([0.5, 1.0], -1.0)];
    for step in 0..3 {
        let mut loss = tape.leaf(0.0);
        for (x, target) in &samples {
            if let LayerOutput::Single(prediction) = mlp.forward(&tape.leaves(x))? {
                loss = loss + (prediction - *target).pow(2.0);
            }
        }

        mlp.zero_grad();
        loss.backward()?;
        println!("step {}: loss = {:.6} ({} nodes recorded)", step, loss.data(), tape.len());
        if step == 2 {
            for (name, param) in mlp.named_parameters().iter().take(6) {
                println!("  {:<8} data={:+.4} grad={:+.4}", name, param.data(), param.grad());
            }
        }
        tape.truncate(mark)?;
    }
    println!("{} nodes kept between steps", tape.len());
    Ok(())
}
