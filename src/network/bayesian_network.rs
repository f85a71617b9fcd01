use std::collections::{BTreeMap, BTreeSet};

use crate::common::error::{Error, Result};
use crate::network::{Factor, Variable};

/// A discrete Bayesian network: the canonical owner of its variables and of
/// one conditional-probability factor per variable.
///
/// The network is immutable once built (see
/// [`NetworkBuilder`](super::NetworkBuilder)) and is never mutated by a
/// query. Each engine clones the factors and variables it needs into an
/// ephemeral working set and discards that set when the query completes, so
/// sequential queries against the same network are fully independent.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    variables: BTreeMap<String, Variable>,
    factors: Vec<Factor>,
}

impl BayesianNetwork {
    pub(crate) fn new(variables: BTreeMap<String, Variable>, factors: Vec<Factor>) -> Self {
        Self { variables, factors }
    }

    /// All variables of the network, keyed by name.
    pub fn variables(&self) -> &BTreeMap<String, Variable> {
        &self.variables
    }

    /// The CPT factors, one per variable, in definition order.
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Look up a variable by name.
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Look up a variable by name, failing with [`Error::UnknownVariable`].
    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Check that `name` is a variable and `outcome` is in its domain.
    pub fn expect_outcome(&self, name: &str, outcome: &str) -> Result<()> {
        let variable = self.variable(name)?;
        if !variable.has_outcome(outcome) {
            return Err(Error::UnknownOutcome {
                variable: name.to_string(),
                outcome: outcome.to_string(),
            });
        }
        Ok(())
    }

    /// True when the network has a directed edge `parent -> child`.
    pub fn is_parent_of(&self, parent: &str, child: &str) -> bool {
        self.variables
            .get(child)
            .is_some_and(|v| v.parents.iter().any(|p| p == parent))
    }

    /// True when the network has a directed edge `parent -> child`, asked
    /// from the child's side.
    pub fn is_child_of(&self, child: &str, parent: &str) -> bool {
        self.is_parent_of(parent, child)
    }

    /// Transitive closure of `name` over parent edges.
    ///
    /// The accumulator doubles as the visited set, so the walk terminates on
    /// any input; on a valid network the parent relation is acyclic anyway.
    pub fn ancestors(&self, name: &str) -> BTreeSet<String> {
        let mut ancestors = BTreeSet::new();
        self.collect_ancestors(name, &mut ancestors);
        ancestors
    }

    fn collect_ancestors(&self, name: &str, ancestors: &mut BTreeSet<String>) {
        if let Some(variable) = self.variables.get(name) {
            for parent in &variable.parents {
                if ancestors.insert(parent.clone()) {
                    self.collect_ancestors(parent, ancestors);
                }
            }
        }
    }
}
