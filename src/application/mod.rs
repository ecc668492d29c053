//! Application layer — use-cases over port traits.
//!
//! Imports only from `crate::domain` and its own `ports`. All I/O is routed
//! through injected port implementations.

pub mod evaluator;
pub mod ports;
pub mod probes;
pub mod report;
