use crate::common::error::{Error, Result};
use crate::network::BayesianNetwork;

/// A posterior query: the target assignment, the observed evidence in input
/// order, and the exact order in which nuisance variables are eliminated.
///
/// The engine performs no order optimization of its own; both correctness
/// of the operation counts and the intermediate table sizes depend on the
/// caller-supplied sequence.
#[derive(Debug, Clone)]
pub struct EliminationQuery {
    pub variable: String,
    pub outcome: String,
    pub evidence: Vec<(String, String)>,
    pub elimination_order: Vec<String>,
}

impl EliminationQuery {
    /// Parse a query line of the form `P(Q=q|E1=e1,E2=e2) X-Y-Z`.
    ///
    /// The evidence block is optional; the elimination order follows the
    /// closing parenthesis, dash-separated. Every referenced name and
    /// outcome is validated against the network before the query is
    /// returned, so the engines never trip over a dangling reference
    /// mid-algorithm.
    pub fn parse(line: &str, network: &BayesianNetwork) -> Result<Self> {
        let open = line
            .find('(')
            .ok_or_else(|| Error::MalformedQuery(line.to_string()))?;
        let close = line
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| Error::MalformedQuery(line.to_string()))?;
        let inner = &line[open + 1..close];
        let tail = line[close + 1..].trim();

        let (target, evidence_part) = match inner.split_once('|') {
            Some((target, evidence)) => (target, Some(evidence)),
            None => (inner, None),
        };
        let (variable, outcome) = parse_assignment(target)?;

        let mut evidence = Vec::new();
        if let Some(part) = evidence_part {
            for token in part.split(',') {
                if token.trim().is_empty() {
                    continue;
                }
                evidence.push(parse_assignment(token)?);
            }
        }

        let elimination_order: Vec<String> = tail
            .split('-')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let query = Self {
            variable,
            outcome,
            evidence,
            elimination_order,
        };
        query.validate(network)?;
        Ok(query)
    }

    /// Check every referenced variable and outcome against the network.
    pub fn validate(&self, network: &BayesianNetwork) -> Result<()> {
        network.expect_outcome(&self.variable, &self.outcome)?;
        for (name, outcome) in &self.evidence {
            network.expect_outcome(name, outcome)?;
        }
        for name in &self.elimination_order {
            network.variable(name)?;
        }
        Ok(())
    }
}

fn parse_assignment(token: &str) -> Result<(String, String)> {
    let (name, outcome) = token
        .split_once('=')
        .ok_or_else(|| Error::MalformedQuery(token.to_string()))?;
    let name = name.trim();
    let outcome = outcome.trim();
    if name.is_empty() || outcome.is_empty() {
        return Err(Error::MalformedQuery(token.to_string()));
    }
    Ok((name.to_string(), outcome.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkBuilder;

    fn network() -> BayesianNetwork {
        let mut builder = NetworkBuilder::new();
        for name in ["B", "E", "A"] {
            builder
                .add_variable(name, vec!["T".into(), "F".into()])
                .unwrap();
        }
        builder.add_cpt("B", vec![], vec![0.1, 0.9]).unwrap();
        builder.add_cpt("E", vec![], vec![0.2, 0.8]).unwrap();
        builder
            .add_cpt(
                "A",
                vec!["B".into(), "E".into()],
                vec![0.9, 0.1, 0.8, 0.2, 0.3, 0.7, 0.1, 0.9],
            )
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_parse_full_query() {
        let query = EliminationQuery::parse("P(B=T|A=T,E=F) E-A", &network()).unwrap();
        assert_eq!(query.variable, "B");
        assert_eq!(query.outcome, "T");
        assert_eq!(
            query.evidence,
            vec![
                ("A".to_string(), "T".to_string()),
                ("E".to_string(), "F".to_string())
            ]
        );
        assert_eq!(query.elimination_order, vec!["E", "A"]);
    }

    #[test]
    fn test_parse_without_evidence_or_order() {
        let query = EliminationQuery::parse("P(B=T)", &network()).unwrap();
        assert!(query.evidence.is_empty());
        assert!(query.elimination_order.is_empty());
    }

    #[test]
    fn test_unknown_variable_is_rejected_at_parse() {
        let err = EliminationQuery::parse("P(Z=T) A", &network()).unwrap_err();
        assert_eq!(err, Error::UnknownVariable("Z".to_string()));
    }

    #[test]
    fn test_unknown_outcome_is_rejected_at_parse() {
        let err = EliminationQuery::parse("P(B=maybe) A", &network()).unwrap_err();
        assert!(matches!(err, Error::UnknownOutcome { .. }));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            EliminationQuery::parse("what is B", &network()),
            Err(Error::MalformedQuery(_))
        ));
        assert!(matches!(
            EliminationQuery::parse("P(B) A", &network()),
            Err(Error::MalformedQuery(_))
        ));
    }
}
