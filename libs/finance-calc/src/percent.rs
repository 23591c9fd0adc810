//! Percentage rewriting
//!
//! `<base> + 10%` means "the base plus ten percent of the base", where the base
//! is everything to the left at the same nesting level. The token stream is
//! parsed once into nested groups, groups are rewritten bottom-up, and every
//! `(+|-) <number> %` becomes `(+|-) ((<base>) * <number> / 100)`.
//!
//! ```text
//! (100-10%)*2-50%
//!   inner:  100-((100)*10/100)                    = 90
//!   outer:  (..)*2-(((..)*2)*50/100)              = 180 - 90 = 90
//! ```

use crate::error::{CalcError, Result};
use crate::lexer::{Operator, Token};
use std::collections::VecDeque;

/// Expression tree node at one nesting level
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Op(Operator),
    Percent,
    Group(Vec<Node>),
}

/// Resolve every percentage in the token stream
pub fn transform_percentages(tokens: &[Token]) -> Result<Vec<Token>> {
    let tree = parse(tokens)?;
    let rewritten = rewrite(tree)?;
    let mut out = Vec::with_capacity(tokens.len());
    flatten(&rewritten, &mut out);
    Ok(out)
}

/// Build the nesting structure; parentheses must already be balanced
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>> {
    let mut levels: Vec<Vec<Node>> = vec![Vec::new()];

    for token in tokens {
        match *token {
            Token::LParen => levels.push(Vec::new()),
            Token::RParen => {
                if levels.len() < 2 {
                    return Err(CalcError::MismatchedParentheses);
                }
                let group = levels.pop().unwrap_or_default();
                current(&mut levels)?.push(Node::Group(group));
            }
            Token::Number(n) => current(&mut levels)?.push(Node::Number(n)),
            Token::Op(op) => current(&mut levels)?.push(Node::Op(op)),
            Token::Percent => current(&mut levels)?.push(Node::Percent),
        }
    }

    match (levels.pop(), levels.is_empty()) {
        (Some(top), true) => Ok(top),
        _ => Err(CalcError::MismatchedParentheses),
    }
}

fn current(levels: &mut [Vec<Node>]) -> Result<&mut Vec<Node>> {
    levels.last_mut().ok_or(CalcError::MismatchedParentheses)
}

/// Rewrite one level, innermost groups first
pub fn rewrite(nodes: Vec<Node>) -> Result<Vec<Node>> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut pending: VecDeque<Node> = nodes.into();

    while let Some(node) = pending.pop_front() {
        match node {
            Node::Group(inner) => out.push(Node::Group(rewrite(inner)?)),
            Node::Op(op) if op.is_additive() => {
                let percentage = match (pending.front(), pending.get(1)) {
                    (Some(&Node::Number(value)), Some(Node::Percent)) => Some(value),
                    _ => None,
                };
                if let Some(value) = percentage {
                    pending.drain(..2);
                    apply_percentage(&mut out, op, value)?;
                } else {
                    out.push(Node::Op(op));
                }
            }
            Node::Percent => return Err(misplaced_percent(&out)),
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Append `op ((base) * value / 100)` where base is everything already emitted
fn apply_percentage(out: &mut Vec<Node>, op: Operator, value: f64) -> Result<()> {
    if out.is_empty() {
        return Err(CalcError::invalid_percent(format!(
            "'{}{}%' has nothing to take a percentage of",
            op, value
        )));
    }

    let base = Node::Group(out.clone());
    out.push(Node::Op(op));
    out.push(Node::Group(vec![
        base,
        Node::Op(Operator::Mul),
        Node::Number(value),
        Node::Op(Operator::Div),
        Node::Number(100.0),
    ]));
    Ok(())
}

fn misplaced_percent(out: &[Node]) -> CalcError {
    let msg = match out {
        [] => "percent sign without a number".to_string(),
        [.., Node::Op(op), Node::Number(_)] => {
            format!("percentage after '{}' is not supported, use + or -", op)
        }
        [Node::Number(_)] => "percentage needs a preceding + or -".to_string(),
        _ => "percent sign must follow a number".to_string(),
    };
    CalcError::invalid_percent(msg)
}

/// Flatten the tree back into tokens
pub fn flatten(nodes: &[Node], out: &mut Vec<Token>) {
    for node in nodes {
        match node {
            Node::Number(n) => out.push(Token::Number(*n)),
            Node::Op(op) => out.push(Token::Op(*op)),
            Node::Percent => out.push(Token::Percent),
            Node::Group(inner) => {
                out.push(Token::LParen);
                flatten(inner, out);
                out.push(Token::RParen);
            }
        }
    }
}
