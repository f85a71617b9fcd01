pub mod bayesian_network;
pub mod builder;
pub mod factor;
pub mod loader;
pub mod variable;

// Re-export the data model for easy access
pub use bayesian_network::BayesianNetwork;
pub use builder::NetworkBuilder;
pub use factor::{Factor, FactorRow};
pub use variable::Variable;
