use std::{
    borrow::Borrow,
    collections::{BTreeSet, HashSet},
    fmt,
    hash::{BuildHasher, Hash},
};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Operator::And => lhs && rhs,
            Operator::Or => lhs || rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}

/// A parsed selector.
///
/// Every variant carries its own `negated` flag; consecutive `not`s are
/// folded into it at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Expr {
    Value {
        tag: String,
        negated: bool,
    },
    Binary {
        lhs: Box<Expr>,
        op: Operator,
        rhs: Box<Expr>,
        negated: bool,
    },
    Group {
        inner: Box<Expr>,
        negated: bool,
    },
}

impl Expr {
    pub fn value(tag: impl Into<String>) -> Self {
        Expr::Value {
            tag: tag.into(),
            negated: false,
        }
    }

    pub fn binary(lhs: Expr, op: Operator, rhs: Expr) -> Self {
        Expr::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
            negated: false,
        }
    }

    pub fn group(inner: Expr) -> Self {
        Expr::Group {
            inner: Box::new(inner),
            negated: false,
        }
    }

    pub fn negated(&self) -> bool {
        match self {
            Expr::Value { negated, .. }
            | Expr::Binary { negated, .. }
            | Expr::Group { negated, .. } => *negated,
        }
    }

    /// Flip the node's own negation.
    pub fn negate(mut self) -> Self {
        match &mut self {
            Expr::Value { negated, .. }
            | Expr::Binary { negated, .. }
            | Expr::Group { negated, .. } => *negated = !*negated,
        }
        self
    }

    pub(super) fn set_negated(&mut self, value: bool) {
        match self {
            Expr::Value { negated, .. }
            | Expr::Binary { negated, .. }
            | Expr::Group { negated, .. } => *negated = value,
        }
    }

    /// Whether an item carrying `tags` is selected.
    pub fn matches<T: TagSet + ?Sized>(&self, tags: &T) -> bool {
        let matched = match self {
            Expr::Value { tag, .. } => tags.contains_tag(tag),
            Expr::Binary { lhs, op, rhs, .. } => op.apply(lhs.matches(tags), rhs.matches(tags)),
            Expr::Group { inner, .. } => inner.matches(tags),
        };
        matched != self.negated()
    }

    /// Distinct tag literals referenced by the tree, in order of appearance.
    pub fn tags(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tags(&mut out);
        out
    }

    fn collect_tags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Value { tag, .. } => {
                if !out.contains(&tag.as_str()) {
                    out.push(tag.as_str());
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_tags(out);
                rhs.collect_tags(out);
            }
            Expr::Group { inner, .. } => inner.collect_tags(out),
        }
    }

    /// An `OR` under an `AND` must be parenthesized to read back the same.
    /// The parser never builds that shape; hand-built trees can.
    fn fmt_operand(&self, parent: Operator, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary {
                op: Operator::Or,
                negated: false,
                ..
            } if parent == Operator::And => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value { tag, negated } => {
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "{tag}")
            }
            Expr::Binary {
                lhs,
                op,
                rhs,
                negated,
            } => {
                if *negated {
                    write!(f, "NOT (")?;
                }
                lhs.fmt_operand(*op, f)?;
                write!(f, " {op} ")?;
                rhs.fmt_operand(*op, f)?;
                if *negated {
                    write!(f, ")")?;
                }
                Ok(())
            }
            Expr::Group { inner, negated } => {
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "({inner})")
            }
        }
    }
}

/// A collection of normalized tags with set semantics.
pub trait TagSet {
    fn contains_tag(&self, tag: &str) -> bool;
}

impl<S, H> TagSet for HashSet<S, H>
where
    S: Borrow<str> + Eq + Hash,
    H: BuildHasher,
{
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }
}

impl<S> TagSet for BTreeSet<S>
where
    S: Borrow<str> + Ord,
{
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }
}

impl<S: AsRef<str>> TagSet for [S] {
    fn contains_tag(&self, tag: &str) -> bool {
        self.iter().any(|t| t.as_ref() == tag)
    }
}

impl<S: AsRef<str>, const N: usize> TagSet for [S; N] {
    fn contains_tag(&self, tag: &str) -> bool {
        self.as_slice().contains_tag(tag)
    }
}

impl<S: AsRef<str>> TagSet for Vec<S> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.as_slice().contains_tag(tag)
    }
}
