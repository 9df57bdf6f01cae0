mod errors;
mod expr;
mod lexer;
mod parser;

use std::{fmt, str::FromStr};

use crate::tag::{HashtagNormalizer, Normalizer};

pub use errors::{ErrorKind, SelectorError};
pub use expr::{Expr, Operator, TagSet};
pub use lexer::{tokenize, Token};
pub use parser::{parse_tokens, Parser, MAX_NODES};

/// Parse a selector using the `#hashtag` normalization scheme.
///
/// Behavior:
/// - Keywords are case-insensitive; tags are normalized (`#Sci_Fi` → `#sci-fi`)
/// - `not` > `and` > `or`; parens group
/// - Fails on the first bad token, no partial tree is returned
pub fn parse(input: &str) -> Result<Expr, SelectorError> {
    parse_with(input, &HashtagNormalizer)
}

/// Parse a selector with a caller-supplied tag normalizer.
pub fn parse_with<N: Normalizer + ?Sized>(input: &str, normalizer: &N) -> Result<Expr, SelectorError> {
    let expr = parse_tokens(tokenize(input), normalizer)?;
    log::debug!("parsed selector {input:?} as {expr}");
    Ok(expr)
}

/// Convenience: parse + evaluate in one call.
pub fn matches<T: TagSet + ?Sized>(input: &str, tags: &T) -> Result<bool, SelectorError> {
    Ok(parse(input)?.matches(tags))
}

/// A selector together with the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    expr: Expr,
}

impl Selector {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn matches<T: TagSet + ?Sized>(&self, tags: &T) -> bool {
        self.expr.matches(tags)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            source: s.to_string(),
            expr: parse(s)?,
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
