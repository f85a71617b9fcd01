use anyhow::{Context, Result};
use bayesnet::bayesball::{BayesBall, IndependenceQuery};
use bayesnet::common::setup::parse_configuration_options;
use bayesnet::inference::{EliminationQuery, VariableElimination};
use bayesnet::network::{loader, BayesianNetwork};
use colored::Colorize;
use log::{error, info};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn main() -> Result<()> {
    let options = parse_configuration_options();

    let network = loader::load_network(Path::new(&options.network_file))?;
    info!(
        "Loaded network '{}' with {} variables",
        options.network_file,
        network.variables().len()
    );

    let queries = File::open(&options.queries_file)
        .with_context(|| format!("Failed to open query file '{}'", options.queries_file))?;
    let mut output = BufWriter::new(
        File::create(&options.output_file)
            .with_context(|| format!("Failed to create output file '{}'", options.output_file))?,
    );

    for (index, line) in BufReader::new(queries).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read query line {}", index + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // A failed query is logged and skipped; it never aborts the run or
        // leaves a partial result in the output file.
        match answer(&network, line) {
            Ok(answer) => writeln!(output, "{answer}")
                .with_context(|| format!("Failed to write result for query {}", index + 1))?,
            Err(err) => error!(
                "query {} '{}' failed: {}",
                index + 1,
                line,
                err.to_string().red()
            ),
        }
    }
    Ok(())
}

/// Dispatch one query line to the matching engine. Posterior queries start
/// with `P(`; everything else is an independence question.
fn answer(network: &BayesianNetwork, line: &str) -> bayesnet::Result<String> {
    if line.starts_with("P(") {
        let query = EliminationQuery::parse(line, network)?;
        let outcome = VariableElimination::new(network, query)?.run()?;
        Ok(outcome.render())
    } else {
        let query = IndependenceQuery::parse(line, network)?;
        let independent = BayesBall::new(network, query)?.run()?;
        Ok(if independent { "yes" } else { "no" }.to_string())
    }
}
