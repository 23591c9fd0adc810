//! Shunting-yard conversion and postfix (RPN) evaluation

use crate::error::{CalcError, Result};
use crate::lexer::{Operator, Token};

/// Postfix sequence element
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostfixItem {
    Number(f64),
    Op(Operator),
}

/// Convert infix tokens to postfix order
///
/// `^` is right-associative; every other operator is left-associative.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<PostfixItem>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match *token {
            Token::Number(n) => output.push(PostfixItem::Number(n)),
            Token::LParen => stack.push(Token::LParen),
            Token::RParen => loop {
                match stack.pop() {
                    Some(Token::Op(op)) => output.push(PostfixItem::Op(op)),
                    Some(Token::LParen) => break,
                    _ => return Err(CalcError::MismatchedParentheses),
                }
            },
            Token::Op(op) => {
                while let Some(&Token::Op(top)) = stack.last() {
                    if top.precedence() < op.precedence()
                        || (op.is_right_associative() && top == op)
                    {
                        break;
                    }
                    output.push(PostfixItem::Op(top));
                    stack.pop();
                }
                stack.push(Token::Op(op));
            }
            Token::Percent => {
                return Err(CalcError::invalid_percent("unresolved percent sign"));
            }
        }
    }

    while let Some(token) = stack.pop() {
        match token {
            Token::Op(op) => output.push(PostfixItem::Op(op)),
            _ => return Err(CalcError::MismatchedParentheses),
        }
    }

    Ok(output)
}

/// Evaluate a postfix sequence with a value stack
pub fn evaluate_postfix(items: &[PostfixItem]) -> Result<f64> {
    let mut stack: Vec<f64> = Vec::with_capacity(items.len());

    for item in items {
        match *item {
            PostfixItem::Number(n) => stack.push(n),
            PostfixItem::Op(op) => {
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(CalcError::malformed(format!(
                        "not enough operands for '{}'",
                        op
                    )));
                };
                stack.push(op.apply(a, b)?);
            }
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        [] => Err(CalcError::malformed("empty expression")),
        _ => Err(CalcError::malformed("missing operator between operands")),
    }
}
