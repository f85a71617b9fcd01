pub mod algebra;
pub mod elimination;
pub mod query;

// Re-export the engine surface for easy access
pub use algebra::OpCounter;
pub use elimination::{EliminationOutcome, VariableElimination};
pub use query::EliminationQuery;
