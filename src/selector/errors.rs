/// Bare failure category of a [`SelectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnmatchedCloseParen,
    UnterminatedGroup,
    InvalidTagLiteral,
    IncompleteExpression,
    TooLarge,
}

/// Syntax errors raised while parsing a selector. Positions are zero-based
/// token indexes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unexpected token \"{token}\" at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("unexpected close paren at position {position}")]
    UnmatchedCloseParen { position: usize },

    #[error("missing close paren")]
    UnterminatedGroup,

    #[error("invalid tag \"{token}\" at position {position}")]
    InvalidTagLiteral { token: String, position: usize },

    #[error("incomplete expression")]
    IncompleteExpression,

    #[error("selector exceeds {limit} tags and groups at position {position}")]
    TooLarge { limit: usize, position: usize },
}

impl SelectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            Self::UnmatchedCloseParen { .. } => ErrorKind::UnmatchedCloseParen,
            Self::UnterminatedGroup => ErrorKind::UnterminatedGroup,
            Self::InvalidTagLiteral { .. } => ErrorKind::InvalidTagLiteral,
            Self::IncompleteExpression => ErrorKind::IncompleteExpression,
            Self::TooLarge { .. } => ErrorKind::TooLarge,
        }
    }

    /// The raw token that caused the failure, when there is one.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::UnexpectedToken { token, .. } | Self::InvalidTagLiteral { token, .. } => {
                Some(token)
            }
            Self::UnmatchedCloseParen { .. } => Some(")"),
            Self::UnterminatedGroup | Self::IncompleteExpression | Self::TooLarge { .. } => None,
        }
    }
}
