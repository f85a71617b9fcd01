use serde::{Deserialize, Serialize};

/// A discrete random variable in a Bayesian network.
///
/// Edges are stored as variable names and resolved through the owning
/// [`BayesianNetwork`](super::BayesianNetwork), so a variable carries no
/// object back-references and per-query snapshots are plain value clones.
/// Whether a variable is observed belongs to a query context, never to the
/// shared node itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique name of the variable within its network
    pub name: String,
    /// Ordered outcome labels, e.g. `["T", "F"]`
    pub outcomes: Vec<String>,
    /// Names of the parent variables
    pub parents: Vec<String>,
    /// Names of the child variables
    pub children: Vec<String>,
}

impl Variable {
    /// Create a variable with the given outcome domain and no edges yet.
    pub fn new(name: &str, outcomes: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            outcomes,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of outcomes in the variable's domain.
    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Check whether `outcome` is one of the variable's outcome labels.
    pub fn has_outcome(&self, outcome: &str) -> bool {
        self.outcomes.iter().any(|o| o == outcome)
    }
}
