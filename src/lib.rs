pub mod bayesball;
pub mod common;
pub mod inference;
pub mod network;

/// Exports the main types for easy access
pub use bayesball::{BayesBall, IndependenceQuery};
pub use common::error::{Error, Result};
pub use inference::{EliminationOutcome, EliminationQuery, VariableElimination};
pub use network::{BayesianNetwork, Factor, FactorRow, NetworkBuilder, Variable};
