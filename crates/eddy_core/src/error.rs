use thiserror::Error;

/// Lookup failures raised inside derivative and nullcline functions.
///
/// These are the only errors user-supplied closures are expected to produce;
/// model operations convert them into `anyhow::Error` on the way out, so a
/// failed lookup names the offending key wherever it surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Variable \"{0}\" is not present in the state snapshot.")]
    MissingVariable(String),

    #[error("Parameter \"{0}\" is not present in the parameter set.")]
    MissingParameter(String),
}
