use thiserror::Error;

pub type Result<T, E = FuzzyError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzyError {
    #[error("Invalid membership parameters: {0}")]
    InvalidParameters(String),

    #[error("Rule has no conditions")]
    EmptyRule,

    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("Unknown term '{term}' on variable '{variable}'")]
    UnknownTerm { variable: String, term: String },

    #[error("Missing input for variable '{0}'")]
    MissingInput(String),

    #[error("Cannot resolve output variable: {0}")]
    AmbiguousOutputVariable(String),

    #[error("Consequent kind {found} is not allowed in a {mode} engine")]
    InconsistentConsequentKind { mode: &'static str, found: &'static str },

    #[error("Variable '{0}' is already registered")]
    DuplicateVariable(String),
}
