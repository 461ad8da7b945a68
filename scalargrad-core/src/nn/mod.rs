// src/nn/mod.rs
//! Neural network building blocks composed from engine operations.

pub mod init;
pub mod layer;
pub mod mlp;
pub mod module; // Trait Module
pub mod neuron;

// Re-export common items
pub use layer::{Layer, LayerOutput};
pub use mlp::Mlp;
pub use module::{zero_grad, Module};
pub use neuron::Neuron;
