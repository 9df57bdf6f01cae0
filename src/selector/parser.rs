use super::{
    errors::SelectorError,
    expr::{Expr, Operator},
    lexer::Token,
};
use crate::tag::Normalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expects a tag, `not` or `(`.
    NeedExpr,
    /// Has a complete expression; expects `and`, `or` or `)`.
    ExtendingExpr,
    /// Waiting on the frame above to close its group.
    InParens,
}

/// Tree under construction. At most one `Binary` lacks its right operand
/// and it always sits on the right spine.
#[derive(Debug, Clone, PartialEq)]
enum Draft {
    Leaf(Expr),
    Binary {
        lhs: Box<Draft>,
        op: Operator,
        rhs: Option<Box<Draft>>,
    },
}

impl Draft {
    fn trailing_slot(&mut self) -> Option<&mut Option<Box<Draft>>> {
        match self {
            Draft::Leaf(_) => None,
            Draft::Binary { rhs, .. } => {
                if rhs.is_none() {
                    return Some(rhs);
                }
                rhs.as_mut()?.trailing_slot()
            }
        }
    }

    /// `None` while a right operand is still missing.
    fn finish(self) -> Option<Expr> {
        match self {
            Draft::Leaf(expr) => Some(expr),
            Draft::Binary { lhs, op, rhs } => Some(Expr::binary(lhs.finish()?, op, rhs?.finish()?)),
        }
    }
}

/// Place a new operand into the tree: it becomes the tree when there is
/// none yet, otherwise it fills the trailing right slot.
fn attach(tree: &mut Option<Draft>, operand: Expr) {
    match tree {
        None => *tree = Some(Draft::Leaf(operand)),
        Some(draft) => match draft.trailing_slot() {
            Some(slot) => *slot = Some(Box::new(Draft::Leaf(operand))),
            None => unreachable!("operand arrived without a pending operator"),
        },
    }
}

/// Extend a complete tree with a binary operator, leaving an empty right
/// slot for the next operand.
///
/// `and` binds tighter than `or`: when an `and` follows a top-level `or`,
/// it takes over that `or`'s right operand instead of wrapping the whole
/// tree. Every other combination wraps the tree as the new left operand.
fn bind_operator(tree: Draft, op: Operator) -> Draft {
    match tree {
        Draft::Binary {
            lhs,
            op: Operator::Or,
            rhs: Some(rhs),
        } if op == Operator::And => Draft::Binary {
            lhs,
            op: Operator::Or,
            rhs: Some(Box::new(Draft::Binary {
                lhs: rhs,
                op,
                rhs: None,
            })),
        },
        tree => Draft::Binary {
            lhs: Box::new(tree),
            op,
            rhs: None,
        },
    }
}

#[derive(Debug)]
struct Frame {
    state: State,
    tree: Option<Draft>,
    negate_next: bool,
}

impl Frame {
    fn new() -> Self {
        Self {
            state: State::NeedExpr,
            tree: None,
            negate_next: false,
        }
    }

    fn accept_operand(&mut self, mut operand: Expr) {
        operand.set_negated(self.negate_next);
        self.negate_next = false;
        attach(&mut self.tree, operand);
        self.state = State::ExtendingExpr;
    }

    fn accept_operator(&mut self, op: Operator) {
        if let Some(tree) = self.tree.take() {
            self.tree = Some(bind_operator(tree, op));
        }
        self.state = State::NeedExpr;
    }

    fn take_expr(&mut self) -> Result<Expr, SelectorError> {
        self.tree
            .take()
            .and_then(Draft::finish)
            .ok_or(SelectorError::IncompleteExpression)
    }
}

/// Upper bound on tags plus groups in one selector. Evaluating, rendering
/// and dropping a tree recurse once per level, and a chain of `n` terms is
/// `n` levels deep.
pub const MAX_NODES: usize = 1024;

/// Single-pass selector parser.
///
/// Each open paren pushes a frame; the frame below it sits in
/// `InParens` until the matching `)` pops the group back into it.
pub struct Parser<'n, N: Normalizer + ?Sized> {
    normalizer: &'n N,
    frames: Vec<Frame>,
    position: usize,
    nodes: usize,
}

impl<'n, N: Normalizer + ?Sized> Parser<'n, N> {
    pub fn new(normalizer: &'n N) -> Self {
        Self {
            normalizer,
            frames: vec![Frame::new()],
            position: 0,
            nodes: 0,
        }
    }

    fn top(&mut self) -> &mut Frame {
        let depth = self.frames.len() - 1;
        &mut self.frames[depth]
    }

    /// Process the next token.
    pub fn on_token(&mut self, token: Token) -> Result<(), SelectorError> {
        let position = self.position;
        self.position += 1;

        let state = self.top().state;
        log::trace!(
            "selector token={token} position={position} state={state:?} depth={}",
            self.frames.len()
        );

        match state {
            State::NeedExpr => self.on_need_expr(token, position),
            State::ExtendingExpr => self.on_extending_expr(token, position),
            State::InParens => unreachable!("the innermost frame is never waiting on a group"),
        }
    }

    fn count_node(&mut self, position: usize) -> Result<(), SelectorError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(SelectorError::TooLarge {
                limit: MAX_NODES,
                position,
            });
        }
        Ok(())
    }

    fn on_need_expr(&mut self, token: Token, position: usize) -> Result<(), SelectorError> {
        if matches!(token, Token::LParen | Token::Tag(_)) {
            self.count_node(position)?;
        }
        match token {
            Token::LParen => {
                self.top().state = State::InParens;
                self.frames.push(Frame::new());
            }
            Token::Not => {
                let frame = self.top();
                frame.negate_next = !frame.negate_next;
            }
            Token::Tag(raw) => {
                let tag = self
                    .normalizer
                    .normalize(&raw)
                    .ok_or(SelectorError::InvalidTagLiteral {
                        token: raw,
                        position,
                    })?;
                self.top().accept_operand(Expr::value(tag));
            }
            other => {
                return Err(SelectorError::UnexpectedToken {
                    token: other.to_string(),
                    position,
                })
            }
        }
        Ok(())
    }

    fn on_extending_expr(&mut self, token: Token, position: usize) -> Result<(), SelectorError> {
        match token {
            Token::And => self.top().accept_operator(Operator::And),
            Token::Or => self.top().accept_operator(Operator::Or),
            Token::RParen => self.close_group(position)?,
            other => {
                return Err(SelectorError::UnexpectedToken {
                    token: other.to_string(),
                    position,
                })
            }
        }
        Ok(())
    }

    fn close_group(&mut self, position: usize) -> Result<(), SelectorError> {
        if self.frames.len() == 1 {
            return Err(SelectorError::UnmatchedCloseParen { position });
        }
        let Some(mut group) = self.frames.pop() else {
            return Err(SelectorError::UnmatchedCloseParen { position });
        };
        let inner = group.take_expr()?;
        self.top().accept_operand(Expr::group(inner));
        Ok(())
    }

    /// Complete the parse once every token has been fed.
    pub fn finish(mut self) -> Result<Expr, SelectorError> {
        if self.frames.len() > 1 {
            return Err(SelectorError::UnterminatedGroup);
        }
        match self.top().state {
            State::ExtendingExpr => self.top().take_expr(),
            State::NeedExpr | State::InParens => Err(SelectorError::IncompleteExpression),
        }
    }
}

/// Run a whole token sequence through a fresh parser.
pub fn parse_tokens<N: Normalizer + ?Sized>(
    tokens: Vec<Token>,
    normalizer: &N,
) -> Result<Expr, SelectorError> {
    let mut parser = Parser::new(normalizer);
    for token in tokens {
        parser.on_token(token)?;
    }
    parser.finish()
}
