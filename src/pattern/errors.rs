use thiserror::Error;

/// Structural violations of an instruction tree. Any of these makes the whole
/// pattern untrustworthy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("{path}: fieldName must not be empty")]
    EmptyFieldName { path: String },

    #[error("{path}: selector must not be empty")]
    EmptySelector { path: String },

    #[error("{path}: composite node must have at least one child")]
    NoChildren { path: String },

    #[error("{path}: duplicate fieldName '{field_name}'")]
    DuplicateFieldName { path: String, field_name: String },

    #[error("pattern has no instructions")]
    NoInstructions,

    #[error("pagination selector must not be empty")]
    EmptyPaginationSelector,

    #[error("malformed pattern json: {0}")]
    Malformed(String),
}
