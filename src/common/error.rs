use thiserror::Error;

/// Failure modes of network construction and of the two query engines.
///
/// Every query runs inside its own error boundary: a failing query returns
/// one of these values and leaves the network and any other queries
/// untouched. A partially-computed probability is never reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A query or definition referenced a variable the network does not contain.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A query referenced an outcome outside the variable's domain.
    #[error("variable '{variable}' has no outcome '{outcome}'")]
    UnknownOutcome { variable: String, outcome: String },

    /// Elimination finished with the query variable present in no factor.
    #[error("query variable '{0}' survives in no factor")]
    QueryUnsatisfiable(String),

    /// The final factor summed to zero, so the posterior is undefined.
    #[error("evidence has zero probability, the posterior is undefined")]
    ZeroProbabilityEvidence,

    /// The network definition is not a valid discrete DAG model.
    #[error("invalid network structure: {0}")]
    InvalidNetworkStructure(String),

    /// A query line could not be parsed.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
