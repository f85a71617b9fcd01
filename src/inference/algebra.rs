use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::common::error::{Error, Result};
use crate::network::{Factor, FactorRow};

/// Accumulator for the arithmetic performed by the factor algebra.
///
/// Threaded explicitly through every operation so the engines stay free of
/// statistics-tracking state and the counts travel with the query result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounter {
    pub additions: u64,
    pub multiplications: u64,
}

/// Multiply two factors by joining their rows on the shared variables.
///
/// Every pair of rows that agrees on the common variables emits one output
/// row (the union assignment, product probability) and costs one
/// multiplication. Output rows appear in the nested iteration order of
/// `f1.rows x f2.rows`, which keeps the result deterministic.
pub fn multiply(f1: &Factor, f2: &Factor, ops: &mut OpCounter) -> Factor {
    let common: Vec<&String> = f1.variables.intersection(&f2.variables).collect();

    let mut rows = Vec::new();
    for r1 in &f1.rows {
        for r2 in &f2.rows {
            if common.iter().all(|v| r1.state(v) == r2.state(v)) {
                let mut states = r1.states.clone();
                states.extend(r2.states.clone());
                rows.push(FactorRow::new(states, r1.probability * r2.probability));
                ops.multiplications += 1;
            }
        }
    }

    let variables = f1.variables.union(&f2.variables).cloned().collect();
    Factor::new(variables, rows, None)
}

/// Fold [`multiply`] over the factors, smallest support first.
///
/// Sorting ascending by support size bounds the width of intermediate
/// tables. A single input is returned unchanged; an empty input is `None`.
pub fn multiply_all(mut factors: Vec<Factor>, ops: &mut OpCounter) -> Option<Factor> {
    factors.sort_by_key(|factor| factor.variables.len());
    let mut iter = factors.into_iter();
    let mut product = iter.next()?;
    for factor in iter {
        product = multiply(&product, &factor, ops);
    }
    Some(product)
}

/// Marginalize `variable` out of the factor.
///
/// Rows that agree on every remaining variable collapse into one; each
/// pairwise merge costs one addition. Total probability mass is preserved.
pub fn sum_out(factor: Factor, variable: &str, ops: &mut OpCounter) -> Factor {
    let mut grouped: BTreeMap<BTreeMap<String, String>, f64> = BTreeMap::new();
    for row in factor.rows {
        let mut states = row.states;
        states.remove(variable);
        match grouped.entry(states) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += row.probability;
                ops.additions += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(row.probability);
            }
        }
    }

    let mut variables = factor.variables;
    variables.remove(variable);
    let rows = grouped
        .into_iter()
        .map(|(states, probability)| FactorRow::new(states, probability))
        .collect();
    Factor::new(variables, rows, factor.owner)
}

/// Scale the rows so their probabilities sum to one.
///
/// A zero sum means the observed evidence has probability zero and no
/// posterior exists. The normalizing-constant additions are accounted by
/// the engine, which knows the query variable's outcome count.
pub fn normalize(factor: &mut Factor) -> Result<()> {
    let sum = factor.probability_sum();
    if sum == 0.0 {
        return Err(Error::ZeroProbabilityEvidence);
    }
    for row in &mut factor.rows {
        row.probability /= sum;
    }
    Ok(())
}
