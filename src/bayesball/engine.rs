use std::collections::HashMap;

use log::debug;

use crate::bayesball::query::IndependenceQuery;
use crate::common::error::Result;
use crate::network::BayesianNetwork;

/// Per-variable bounce bookkeeping: how many times the running path prefix
/// has entered the variable from a parent edge and from a child edge.
///
/// Each direction may be used once per prefix and is released on backtrack.
/// A single global visited mark would forbid the legal collider revisit (a
/// ball passing down through a node and later bouncing back up through it);
/// unbounded revisiting would not terminate. The direction-scoped cap
/// admits exactly the revisits Bayes-Ball needs.
#[derive(Debug, Default)]
struct VisitCount {
    from_parent: u32,
    from_child: u32,
}

/// Bayes-Ball search for an active trail between two variables.
///
/// Runs a depth-first search over the undirected skeleton of the DAG. The
/// verdict starts at independent and flips permanently the moment one path
/// into the end variable survives the blocking rules; all remaining
/// recursion then unwinds without exploring further.
pub struct BayesBall<'a> {
    network: &'a BayesianNetwork,
    query: IndependenceQuery,
    visits: HashMap<String, VisitCount>,
    dependent: bool,
}

impl<'a> BayesBall<'a> {
    /// Validate the query against the network.
    pub fn new(network: &'a BayesianNetwork, query: IndependenceQuery) -> Result<Self> {
        query.validate(network)?;
        Ok(Self {
            network,
            query,
            visits: HashMap::new(),
            dependent: false,
        })
    }

    /// Exhaust all trails from start to end; `true` means independent.
    pub fn run(mut self) -> Result<bool> {
        let start = self.query.start.clone();
        let mut path = Vec::new();
        self.walk(&start, &mut path, None, false);
        Ok(!self.dependent)
    }

    fn walk(
        &mut self,
        current: &str,
        path: &mut Vec<String>,
        previous: Option<&str>,
        from_child: bool,
    ) {
        if self.dependent {
            return; // dependence already proven, unwind
        }
        if previous.is_some() && !self.try_enter(current, from_child) {
            return;
        }

        path.push(current.to_string());
        if current == self.query.end {
            self.validate_path(path);
        } else {
            let (children, parents) = match self.network.get_variable(current) {
                Some(variable) => (variable.children.clone(), variable.parents.clone()),
                None => (Vec::new(), Vec::new()),
            };
            for child in &children {
                self.walk(child, path, Some(current), false);
            }
            for parent in &parents {
                self.walk(parent, path, Some(current), true);
            }
        }
        path.pop();

        if previous.is_some() {
            self.leave(current, from_child);
        }
    }

    /// Consume the one-shot direction cap, refusing re-entry from a
    /// direction the running path prefix already used.
    fn try_enter(&mut self, name: &str, from_child: bool) -> bool {
        let visit = self.visits.entry(name.to_string()).or_default();
        let count = if from_child {
            &mut visit.from_child
        } else {
            &mut visit.from_parent
        };
        if *count >= 1 {
            return false;
        }
        *count += 1;
        true
    }

    /// Release the direction cap on backtrack, symmetric to `try_enter`.
    fn leave(&mut self, name: &str, from_child: bool) {
        if let Some(visit) = self.visits.get_mut(name) {
            let count = if from_child {
                &mut visit.from_child
            } else {
                &mut visit.from_parent
            };
            *count = count.saturating_sub(1);
        }
    }

    /// Check a completed trail against the blocking rules; a trail no rule
    /// blocks proves dependence.
    ///
    /// At each intermediate step the incoming edge direction decides the
    /// local structure: an evidence node passes the ball only through a
    /// collider (entered from a parent, exited toward another parent); an
    /// unobserved node blocks only the collider it leaves closed (entered
    /// from a parent, exited toward anything but a child).
    fn validate_path(&mut self, path: &[String]) {
        for i in 0..path.len().saturating_sub(1) {
            let prev = &path[i];
            let current = &path[i + 1];
            let next = path.get(i + 2);
            let direction_up = self.network.is_parent_of(prev, current);

            if self.query.evidence.contains(current.as_str()) {
                if direction_up {
                    if let Some(next) = next {
                        if !self.network.is_parent_of(next, current) {
                            return; // evidence node exits anywhere but a second parent
                        }
                    }
                } else {
                    return; // evidence blocks every trail entered from a child
                }
            } else if direction_up {
                if let Some(next) = next {
                    if !self.network.is_child_of(next, current) {
                        return; // unobserved collider stays closed
                    }
                }
            }
        }
        debug!("active trail: {}", path.join(" -> "));
        self.dependent = true;
    }
}
