//! NEAT-style genomes for evolved lander controllers
//!
//! This crate implements:
//! - Node and connection genes with per-genome innovation numbers
//! - Structural mutation (split a connection, add a connection) and weight mutation
//! - A single-pass, creation-ordered network evaluation
//!
//! The crate knows nothing about landers: drivers feed it sensor vectors and
//! interpret the output vector themselves.

pub mod error;
pub mod genome;
pub mod node;
pub mod rng;

// Re-export main types for convenience
pub use error::GenomeError;
pub use genome::{Genome, MutationOutcome, MutationRates};
pub use node::{Connection, Node, NodeKind};
