// ⚠️ Rule Errors - the only failure the engine itself can raise
// Normalization never fails; configuration can.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A configuration value fell outside its accepted range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;
