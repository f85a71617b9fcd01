use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::network::{BayesianNetwork, NetworkBuilder};

/// Serde model of a network definition file.
///
/// The file enumerates variables with their ordered outcome labels, then one
/// definition per variable: its parent list and a flattened probability
/// table in row-major order over `(given..., for)` with the `for` variable
/// varying fastest.
#[derive(Debug, Deserialize)]
pub struct NetworkFile {
    pub variables: Vec<VariableEntry>,
    pub definitions: Vec<DefinitionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub outcomes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DefinitionEntry {
    #[serde(rename = "for")]
    pub child: String,
    #[serde(default)]
    pub given: Vec<String>,
    pub table: Vec<f64>,
}

/// Read and build a network from a JSON definition file.
pub fn load_network(path: &Path) -> Result<BayesianNetwork> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read network file '{}'", path.display()))?;
    parse_network(&text)
        .with_context(|| format!("Failed to build network from '{}'", path.display()))
}

/// Build a network from the JSON text of a definition file.
pub fn parse_network(text: &str) -> Result<BayesianNetwork> {
    let document: NetworkFile =
        serde_json::from_str(text).context("Failed to parse network definition")?;

    let mut builder = NetworkBuilder::new();
    for variable in document.variables {
        builder.add_variable(&variable.name, variable.outcomes)?;
    }
    for definition in document.definitions {
        builder.add_cpt(&definition.child, definition.given, definition.table)?;
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRINKLER: &str = r#"{
        "variables": [
            {"name": "Rain", "outcomes": ["T", "F"]},
            {"name": "Sprinkler", "outcomes": ["T", "F"]},
            {"name": "WetGrass", "outcomes": ["T", "F"]}
        ],
        "definitions": [
            {"for": "Rain", "table": [0.2, 0.8]},
            {"for": "Sprinkler", "given": ["Rain"], "table": [0.01, 0.99, 0.4, 0.6]},
            {"for": "WetGrass", "given": ["Sprinkler", "Rain"],
             "table": [0.99, 0.01, 0.9, 0.1, 0.8, 0.2, 0.0, 1.0]}
        ]
    }"#;

    #[test]
    fn test_parse_network_builds_variables_and_factors() {
        let network = parse_network(SPRINKLER).unwrap();
        assert_eq!(network.variables().len(), 3);
        assert_eq!(network.factors().len(), 3);
        assert!(network.is_parent_of("Rain", "WetGrass"));
        assert!(network.is_parent_of("Rain", "Sprinkler"));

        let wet = &network.factors()[2];
        assert_eq!(wet.variables.len(), 3);
        assert_eq!(wet.rows.len(), 8);
        // First row: Sprinkler=T, Rain=T, WetGrass=T
        assert_eq!(wet.rows[0].state("WetGrass"), Some("T"));
        assert_eq!(wet.rows[0].probability, 0.99);
    }

    #[test]
    fn test_missing_given_defaults_to_root() {
        let network = parse_network(SPRINKLER).unwrap();
        assert!(network.get_variable("Rain").unwrap().parents.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_network("{not json").is_err());
    }

    #[test]
    fn test_structural_errors_propagate() {
        let text = r#"{
            "variables": [{"name": "A", "outcomes": ["T", "F"]}],
            "definitions": [{"for": "A", "table": [0.5]}]
        }"#;
        let err = parse_network(text).unwrap_err();
        assert!(err.to_string().contains("invalid network structure"));
    }
}
