use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;

use crate::common::error::{Error, Result};
use crate::inference::algebra::{self, OpCounter};
use crate::inference::query::EliminationQuery;
use crate::network::{BayesianNetwork, Factor, Variable};

/// Exact posterior produced by [`VariableElimination::run`], together with
/// the arithmetic spent computing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EliminationOutcome {
    pub probability: f64,
    pub additions: u64,
    pub multiplications: u64,
}

impl EliminationOutcome {
    /// Render `probability,additions,multiplications` with the probability
    /// rounded half-up to five decimal places.
    pub fn render(&self) -> String {
        let rounded = (self.probability * 100_000.0).round() / 100_000.0;
        format!("{:.5},{},{}", rounded, self.additions, self.multiplications)
    }
}

impl fmt::Display for EliminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Variable Elimination over a per-query snapshot of the network.
///
/// The engine clones the network's factor list and variable map at
/// construction and consumes itself on [`run`](Self::run); the shared
/// network is read for topology only and never mutated, so any number of
/// queries can follow each other against the same network.
#[derive(Debug)]
pub struct VariableElimination<'a> {
    network: &'a BayesianNetwork,
    query: EliminationQuery,
    factors: Vec<Factor>,
    variables: BTreeMap<String, Variable>,
}

impl<'a> VariableElimination<'a> {
    /// Validate the query against the network and snapshot the factors.
    pub fn new(network: &'a BayesianNetwork, query: EliminationQuery) -> Result<Self> {
        query.validate(network)?;
        Ok(Self {
            network,
            factors: network.factors().to_vec(),
            variables: network.variables().clone(),
            query,
        })
    }

    /// Run the pipeline: restrict, prune, eliminate, finalize, report.
    pub fn run(mut self) -> Result<EliminationOutcome> {
        let mut ops = OpCounter::default();

        self.restrict_evidence();
        self.prune_irrelevant_factors();
        self.eliminate_all(&mut ops);
        let final_factor = self.finalize(&mut ops)?;
        self.read_answer(&final_factor, ops)
    }

    /// Fix every evidence variable to its observed outcome across the whole
    /// working set, dropping the variable from the working map.
    fn restrict_evidence(&mut self) {
        for (name, outcome) in &self.query.evidence {
            self.variables.remove(name);
            for factor in &mut self.factors {
                factor.restrict(name, outcome);
            }
        }
    }

    /// Drop CPT factors whose owner can influence neither the query nor the
    /// evidence: only the query variable, the evidence variables, and their
    /// ancestors are relevant. Factors without an owner (created
    /// mid-elimination) are exempt, but this pass runs once, up front.
    fn prune_irrelevant_factors(&mut self) {
        let mut relevant: BTreeSet<String> = BTreeSet::new();
        relevant.insert(self.query.variable.clone());
        relevant.extend(self.network.ancestors(&self.query.variable));
        for (name, _) in &self.query.evidence {
            relevant.insert(name.clone());
            relevant.extend(self.network.ancestors(name));
        }

        let before = self.factors.len();
        self.factors.retain(|factor| match &factor.owner {
            Some(owner) => relevant.contains(owner),
            None => true,
        });
        debug!(
            "pruned {} of {before} factors as irrelevant",
            before - self.factors.len()
        );
    }

    fn eliminate_all(&mut self, ops: &mut OpCounter) {
        let order = self.query.elimination_order.clone();
        for name in &order {
            self.eliminate(name, ops);
        }
    }

    /// Multiply every factor mentioning `name` into one and sum the variable
    /// out. A variable no factor mentions was already restricted or pruned
    /// away, and eliminating it is a silent no-op.
    fn eliminate(&mut self, name: &str, ops: &mut OpCounter) {
        let (mentioning, rest): (Vec<Factor>, Vec<Factor>) = self
            .factors
            .drain(..)
            .partition(|factor| factor.contains_variable(name));
        self.factors = rest;

        let Some(product) = algebra::multiply_all(mentioning, ops) else {
            debug!("skipping '{name}': no factor mentions it");
            return;
        };
        let summed = algebra::sum_out(product, name, ops);
        self.factors.push(summed);
        self.variables.remove(name);
    }

    /// Reunify whatever still mentions the query variable into a single
    /// factor and normalize it. The normalizing constant costs one addition
    /// per outcome beyond the first.
    fn finalize(&mut self, ops: &mut OpCounter) -> Result<Factor> {
        let mentioning: Vec<Factor> = self
            .factors
            .drain(..)
            .filter(|factor| factor.contains_variable(&self.query.variable))
            .collect();

        let Some(mut product) = algebra::multiply_all(mentioning, ops) else {
            return Err(Error::QueryUnsatisfiable(self.query.variable.clone()));
        };
        algebra::normalize(&mut product)?;
        // The query variable is still in the working map here: restriction
        // and elimination both remove a variable only after emptying it out
        // of the factors, and an emptied query variable fails above.
        let outcome_count = self
            .variables
            .get(&self.query.variable)
            .ok_or_else(|| Error::QueryUnsatisfiable(self.query.variable.clone()))?
            .outcome_count();
        ops.additions += outcome_count as u64 - 1;
        Ok(product)
    }

    fn read_answer(&self, factor: &Factor, ops: OpCounter) -> Result<EliminationOutcome> {
        let row = factor
            .rows_with_state(&self.query.variable, &self.query.outcome)
            .next()
            .ok_or_else(|| Error::QueryUnsatisfiable(self.query.variable.clone()))?;
        Ok(EliminationOutcome {
            probability: row.probability,
            additions: ops.additions,
            multiplications: ops.multiplications,
        })
    }
}
