use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::common::error::{Error, Result};
use crate::network::{BayesianNetwork, Factor, FactorRow, Variable};

struct Definition {
    child: String,
    parents: Vec<String>,
    table: Vec<f64>,
}

/// Accumulates variable declarations and conditional probability tables,
/// validates the structure eagerly, and produces the immutable network.
///
/// All structural problems (duplicate names, unknown references, wrong table
/// sizes, cycles) are rejected here at construction time; the query engines
/// can then assume a well-formed DAG.
pub struct NetworkBuilder {
    variables: BTreeMap<String, Variable>,
    definitions: Vec<Definition>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
            definitions: Vec::new(),
        }
    }

    /// Declare a variable with its ordered outcome domain.
    pub fn add_variable(&mut self, name: &str, outcomes: Vec<String>) -> Result<()> {
        if outcomes.is_empty() {
            return Err(Error::InvalidNetworkStructure(format!(
                "variable '{name}' has an empty outcome domain"
            )));
        }
        let distinct: BTreeSet<&String> = outcomes.iter().collect();
        if distinct.len() != outcomes.len() {
            return Err(Error::InvalidNetworkStructure(format!(
                "variable '{name}' has duplicate outcome labels"
            )));
        }
        if self.variables.contains_key(name) {
            return Err(Error::InvalidNetworkStructure(format!(
                "duplicate variable name '{name}'"
            )));
        }
        self.variables
            .insert(name.to_string(), Variable::new(name, outcomes));
        Ok(())
    }

    /// Attach the conditional probability table of `child` given `parents`.
    ///
    /// The flat `table` is row-major over `(parents..., child)` with the
    /// child outcome varying fastest, and must cover every combination
    /// exactly once.
    pub fn add_cpt(&mut self, child: &str, parents: Vec<String>, table: Vec<f64>) -> Result<()> {
        if !self.variables.contains_key(child) {
            return Err(Error::UnknownVariable(child.to_string()));
        }
        if self.definitions.iter().any(|d| d.child == child) {
            return Err(Error::InvalidNetworkStructure(format!(
                "variable '{child}' has more than one probability table"
            )));
        }
        let mut expected_rows = 1usize;
        let mut seen = BTreeSet::new();
        for parent in &parents {
            let parent_variable = self
                .variables
                .get(parent)
                .ok_or_else(|| Error::UnknownVariable(parent.to_string()))?;
            if parent == child || !seen.insert(parent.clone()) {
                return Err(Error::InvalidNetworkStructure(format!(
                    "variable '{child}' lists '{parent}' more than once in its parents"
                )));
            }
            expected_rows *= parent_variable.outcome_count();
        }
        expected_rows *= self.variables[child].outcome_count();
        if table.len() != expected_rows {
            return Err(Error::InvalidNetworkStructure(format!(
                "table for '{child}' has {} entries, expected {expected_rows}",
                table.len()
            )));
        }

        for parent in &parents {
            if let Some(parent_variable) = self.variables.get_mut(parent) {
                parent_variable.children.push(child.to_string());
            }
        }
        if let Some(child_variable) = self.variables.get_mut(child) {
            child_variable.parents = parents.clone();
        }

        self.definitions.push(Definition {
            child: child.to_string(),
            parents,
            table,
        });
        Ok(())
    }

    /// Validate the accumulated structure and build the network.
    pub fn build(self) -> Result<BayesianNetwork> {
        for name in self.variables.keys() {
            if !self.definitions.iter().any(|d| &d.child == name) {
                return Err(Error::InvalidNetworkStructure(format!(
                    "variable '{name}' has no probability table"
                )));
            }
        }

        let mut factors = Vec::with_capacity(self.definitions.len());
        for definition in &self.definitions {
            factors.push(self.build_factor(definition));
        }
        let network = BayesianNetwork::new(self.variables, factors);

        // The parent relation must be acyclic; the ancestor walk is
        // visited-guarded, so a cycle shows up as a self-ancestor.
        for name in network.variables().keys() {
            if network.ancestors(name).contains(name) {
                return Err(Error::InvalidNetworkStructure(format!(
                    "cycle through variable '{name}'"
                )));
            }
        }
        debug!(
            "built network: {} variables, {} factors",
            network.variables().len(),
            network.factors().len()
        );
        Ok(network)
    }

    fn build_factor(&self, definition: &Definition) -> Factor {
        let mut scope: Vec<&Variable> = definition
            .parents
            .iter()
            .map(|p| &self.variables[p])
            .collect();
        scope.push(&self.variables[&definition.child]);

        let mut rows = Vec::with_capacity(definition.table.len());
        let mut states = BTreeMap::new();
        fill_rows(&scope, &definition.table, 0, &mut states, &mut rows);

        let variables: BTreeSet<String> = scope.iter().map(|v| v.name.clone()).collect();
        Factor::new(variables, rows, Some(definition.child.clone()))
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand the flat probability table into one row per outcome combination.
/// The last scope variable (the CPT's own child) varies fastest, matching
/// the row-major layout of the definition input.
fn fill_rows(
    scope: &[&Variable],
    table: &[f64],
    depth: usize,
    states: &mut BTreeMap<String, String>,
    rows: &mut Vec<FactorRow>,
) {
    if depth == scope.len() {
        let probability = table[rows.len()];
        rows.push(FactorRow::new(states.clone(), probability));
        return;
    }
    let variable = scope[depth];
    for outcome in &variable.outcomes {
        states.insert(variable.name.clone(), outcome.clone());
        fill_rows(scope, table, depth + 1, states, rows);
    }
    states.remove(&variable.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_outcomes() -> Vec<String> {
        vec!["T".to_string(), "F".to_string()]
    }

    #[test]
    fn test_duplicate_variable_name_is_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        let err = builder.add_variable("A", two_outcomes()).unwrap_err();
        assert!(matches!(err, Error::InvalidNetworkStructure(_)));
    }

    #[test]
    fn test_empty_outcome_domain_is_rejected() {
        let mut builder = NetworkBuilder::new();
        let err = builder.add_variable("A", vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidNetworkStructure(_)));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        let err = builder
            .add_cpt("A", vec!["Ghost".into()], vec![0.5, 0.5])
            .unwrap_err();
        assert_eq!(err, Error::UnknownVariable("Ghost".to_string()));
    }

    #[test]
    fn test_wrong_table_length_is_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        builder.add_variable("B", two_outcomes()).unwrap();
        let err = builder
            .add_cpt("B", vec!["A".into()], vec![0.5, 0.5])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidNetworkStructure(_)));
    }

    #[test]
    fn test_missing_table_is_rejected_at_build() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, Error::InvalidNetworkStructure(_)));
    }

    #[test]
    fn test_cycle_is_rejected_at_build() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        builder.add_variable("B", two_outcomes()).unwrap();
        builder
            .add_cpt("A", vec!["B".into()], vec![0.5, 0.5, 0.5, 0.5])
            .unwrap();
        builder
            .add_cpt("B", vec!["A".into()], vec![0.5, 0.5, 0.5, 0.5])
            .unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, Error::InvalidNetworkStructure(_)));
    }

    #[test]
    fn test_edges_are_mutually_consistent() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("A", two_outcomes()).unwrap();
        builder.add_variable("B", two_outcomes()).unwrap();
        builder.add_cpt("A", vec![], vec![0.3, 0.7]).unwrap();
        builder
            .add_cpt("B", vec!["A".into()], vec![0.9, 0.1, 0.2, 0.8])
            .unwrap();
        let network = builder.build().unwrap();

        let a = network.get_variable("A").unwrap();
        let b = network.get_variable("B").unwrap();
        assert_eq!(a.children, vec!["B".to_string()]);
        assert_eq!(b.parents, vec!["A".to_string()]);
    }

    #[test]
    fn test_rows_are_generated_child_fastest() {
        let mut builder = NetworkBuilder::new();
        builder.add_variable("P", two_outcomes()).unwrap();
        builder.add_variable("C", two_outcomes()).unwrap();
        builder.add_cpt("P", vec![], vec![0.5, 0.5]).unwrap();
        builder
            .add_cpt("C", vec!["P".into()], vec![0.9, 0.1, 0.2, 0.8])
            .unwrap();
        let network = builder.build().unwrap();

        let factor = &network.factors()[1];
        assert_eq!(factor.owner.as_deref(), Some("C"));
        // (P=T, C=T), (P=T, C=F), (P=F, C=T), (P=F, C=F)
        let expected = [
            (("T", "T"), 0.9),
            (("T", "F"), 0.1),
            (("F", "T"), 0.2),
            (("F", "F"), 0.8),
        ];
        for (row, ((p, c), probability)) in factor.rows.iter().zip(expected) {
            assert_eq!(row.state("P"), Some(p));
            assert_eq!(row.state("C"), Some(c));
            assert_eq!(row.probability, probability);
        }
    }
}
