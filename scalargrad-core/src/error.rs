use thiserror::Error;

/// Custom error type for the scalargrad engine and its network modules.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum ScalargradError {
    #[error("Shape mismatch: expected {expected} inputs, got {actual} during operation {operation}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("Values recorded on different tapes cannot be combined (operation {operation})")]
    TapeMismatch { operation: String },

    #[error("Value {node} refers to a node discarded by Tape::truncate")]
    StaleValue { node: usize },

    #[error("Tape mark at {mark} nodes is past the end of the tape ({len} nodes)")]
    InvalidMark { mark: usize, len: usize },

    #[error("Cycle detected in the computation graph at node {node} during backward pass.")]
    CycleDetected { node: usize },
}
