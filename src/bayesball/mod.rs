pub mod engine;
pub mod query;

// Re-export the engine surface for easy access
pub use engine::BayesBall;
pub use query::IndependenceQuery;
