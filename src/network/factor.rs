use std::collections::{BTreeMap, BTreeSet};

/// One row of a probability table: an assignment of outcomes to the
/// variables currently in the owning factor, plus the row probability.
///
/// The key set of `states` always equals the owning factor's variable set;
/// restriction and marginalization shrink both together.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    /// Map of variable names to their assigned outcomes
    pub states: BTreeMap<String, String>,
    /// Probability of this assignment
    pub probability: f64,
}

impl FactorRow {
    pub fn new(states: BTreeMap<String, String>, probability: f64) -> Self {
        Self { states, probability }
    }

    /// The outcome assigned to `variable` in this row, if present.
    pub fn state(&self, variable: &str) -> Option<&str> {
        self.states.get(variable).map(String::as_str)
    }

    /// Check whether this row assigns `outcome` to `variable`.
    pub fn matches(&self, variable: &str, outcome: &str) -> bool {
        self.state(variable) == Some(outcome)
    }

    /// Drop `variable` from the row's assignment.
    pub fn remove_variable(&mut self, variable: &str) {
        self.states.remove(variable);
    }
}

/// A probability table over a named set of variables.
///
/// Built once per conditional probability table at network construction, over
/// `parents + self` of the owning variable; per query, factors are cloned so
/// restriction and merging never touch the shared network.
#[derive(Debug, Clone)]
pub struct Factor {
    /// Support set of the table; every row keys exactly these names
    pub variables: BTreeSet<String>,
    /// All rows of the table, one per outcome combination at construction
    pub rows: Vec<FactorRow>,
    /// Child variable of the CPT this factor came from; `None` for factors
    /// produced mid-elimination
    pub owner: Option<String>,
}

impl Factor {
    pub fn new(variables: BTreeSet<String>, rows: Vec<FactorRow>, owner: Option<String>) -> Self {
        Self { variables, rows, owner }
    }

    /// Check whether the factor's support contains `variable`.
    pub fn contains_variable(&self, variable: &str) -> bool {
        self.variables.contains(variable)
    }

    /// Fix `variable` to an observed outcome.
    ///
    /// Keeps only the rows that agree with the observation, then drops the
    /// variable from every remaining row and from the support set. A factor
    /// that does not mention the variable is left untouched; restriction is
    /// applied blindly to every factor in a working set.
    pub fn restrict(&mut self, variable: &str, outcome: &str) {
        if !self.variables.contains(variable) {
            return;
        }
        self.rows.retain(|row| row.matches(variable, outcome));
        for row in &mut self.rows {
            row.remove_variable(variable);
        }
        self.variables.remove(variable);
    }

    /// Sum of all row probabilities.
    pub fn probability_sum(&self) -> f64 {
        self.rows.iter().map(|row| row.probability).sum()
    }

    /// The rows assigning `outcome` to `variable`.
    pub fn rows_with_state<'a>(
        &'a self,
        variable: &'a str,
        outcome: &'a str,
    ) -> impl Iterator<Item = &'a FactorRow> {
        self.rows.iter().filter(move |row| row.matches(variable, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn coin_pair_factor() -> Factor {
        let variables: BTreeSet<String> = ["A".to_string(), "B".to_string()].into();
        let rows = vec![
            FactorRow::new(states(&[("A", "T"), ("B", "T")]), 0.1),
            FactorRow::new(states(&[("A", "T"), ("B", "F")]), 0.2),
            FactorRow::new(states(&[("A", "F"), ("B", "T")]), 0.3),
            FactorRow::new(states(&[("A", "F"), ("B", "F")]), 0.4),
        ];
        Factor::new(variables, rows, Some("B".to_string()))
    }

    #[test]
    fn test_restrict_keeps_matching_rows_and_drops_variable() {
        let mut factor = coin_pair_factor();
        factor.restrict("A", "T");

        assert!(!factor.contains_variable("A"));
        assert_eq!(factor.rows.len(), 2);
        for row in &factor.rows {
            assert!(row.state("A").is_none());
        }
        assert_eq!(factor.rows[0].probability, 0.1);
        assert_eq!(factor.rows[1].probability, 0.2);
    }

    #[test]
    fn test_restrict_absent_variable_is_a_no_op() {
        let mut factor = coin_pair_factor();
        let before = factor.rows.clone();
        factor.restrict("C", "T");
        assert_eq!(factor.rows, before);
        assert_eq!(factor.variables.len(), 2);
    }

    #[test]
    fn test_restrict_twice_is_idempotent() {
        let mut once = coin_pair_factor();
        once.restrict("B", "F");
        let mut twice = once.clone();
        twice.restrict("B", "F");
        assert_eq!(once.rows, twice.rows);
        assert_eq!(once.variables, twice.variables);
    }

    #[test]
    fn test_probability_sum() {
        let factor = coin_pair_factor();
        assert!((factor.probability_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rows_with_state() {
        let factor = coin_pair_factor();
        let probabilities: Vec<f64> = factor
            .rows_with_state("B", "T")
            .map(|row| row.probability)
            .collect();
        assert_eq!(probabilities, vec![0.1, 0.3]);
    }
}
