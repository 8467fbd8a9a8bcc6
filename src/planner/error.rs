use sqlparser::tokenizer::TokenizerError;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("SQL tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
    #[error("Unsupported statement '{0}', type 'help;' for the supported syntax")]
    UnsupportedStatement(String),
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Syntax error: {0}")]
    Unexpected(String),
    #[error("Syntax error: {message}. Expected: {usage}")]
    InvalidSyntax { message: String, usage: &'static str },
    #[error("Unsupported constraint: {0}")]
    UnsupportedConstraint(String),
}

impl PlannerError {
    /// Attaches the grammar of the statement being parsed to a bare syntax error.
    pub fn with_usage(self, usage: &'static str) -> Self {
        match self {
            PlannerError::Unexpected(message) => PlannerError::InvalidSyntax { message, usage },
            other => other,
        }
    }
}
