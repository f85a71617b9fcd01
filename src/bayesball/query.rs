use std::collections::BTreeSet;

use crate::common::error::{Error, Result};
use crate::network::BayesianNetwork;

/// A conditional-independence question: are `start` and `end` d-separated
/// by the evidence set?
///
/// Evidence outcomes are irrelevant to d-separation, so only the observed
/// variable names are kept.
#[derive(Debug, Clone)]
pub struct IndependenceQuery {
    pub start: String,
    pub end: String,
    pub evidence: BTreeSet<String>,
}

impl IndependenceQuery {
    /// Parse a query line of the form `A-B|E1=e1,E2=e2`.
    ///
    /// The evidence block is optional and its `=outcome` parts may be
    /// omitted. Every referenced name is validated against the network.
    pub fn parse(line: &str, network: &BayesianNetwork) -> Result<Self> {
        let (pair, evidence_part) = match line.split_once('|') {
            Some((pair, evidence)) => (pair, Some(evidence)),
            None => (line, None),
        };
        let (start, end) = pair
            .split_once('-')
            .ok_or_else(|| Error::MalformedQuery(line.to_string()))?;
        let start = start.trim();
        let end = end.trim();
        if start.is_empty() || end.is_empty() {
            return Err(Error::MalformedQuery(line.to_string()));
        }

        let mut evidence = BTreeSet::new();
        if let Some(part) = evidence_part {
            for token in part.split(',') {
                let name = match token.split_once('=') {
                    Some((name, _outcome)) => name,
                    None => token,
                };
                let name = name.trim();
                if !name.is_empty() {
                    evidence.insert(name.to_string());
                }
            }
        }

        let query = Self {
            start: start.to_string(),
            end: end.to_string(),
            evidence,
        };
        query.validate(network)?;
        Ok(query)
    }

    /// Check every referenced variable against the network.
    pub fn validate(&self, network: &BayesianNetwork) -> Result<()> {
        network.variable(&self.start)?;
        network.variable(&self.end)?;
        for name in &self.evidence {
            network.variable(name)?;
        }
        Ok(())
    }
}
