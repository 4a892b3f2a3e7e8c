//! Request handlers for flag evaluation.

mod evaluate;

pub use evaluate::*;
