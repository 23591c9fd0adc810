//! Input normalization and tokenization
//!
//! Turns raw user text into a flat token stream:
//! whitespace is dropped, `,` becomes the decimal point, the character set is
//! checked, and unclosed trailing groups are closed.

use crate::error::{CalcError, Result};
use std::fmt;

/// Symbols accepted besides ASCII digits
const ALLOWED_SYMBOLS: &str = "+-*/()^.%";

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '^' => Some(Self::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }

    /// `+ -` = 1, `* /` = 2, `^` = 3
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, Self::Pow)
    }

    /// Operators a percentage may follow
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }

    /// Apply as `a <op> b`
    pub fn apply(self, a: f64, b: f64) -> Result<f64> {
        match self {
            Self::Add => Ok(a + b),
            Self::Sub => Ok(a - b),
            Self::Mul => Ok(a * b),
            Self::Div => {
                if b == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(a / b)
            }
            Self::Pow => Ok(a.powf(b)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Lexical token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Number(f64),
    Op(Operator),
    Percent,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Op(op) => write!(f, "{}", op),
            Token::Percent => f.write_str("%"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Render a token stream back to compact infix text (for logs and tests)
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(ToString::to_string).collect()
}

/// Drop whitespace, lower-case, and use `.` as the decimal separator
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Reject anything outside `[0-9+\-*/()^.%]`
pub fn validate_characters(expression: &str) -> Result<()> {
    let mut invalid: Vec<char> = Vec::new();
    for c in expression.chars() {
        if !c.is_ascii_digit() && !ALLOWED_SYMBOLS.contains(c) && !invalid.contains(&c) {
            invalid.push(c);
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(CalcError::invalid_characters(
            invalid.into_iter().collect::<String>(),
        ))
    }
}

/// Close unclosed trailing groups; excess `)` is never repaired
pub fn balance_parentheses(mut expression: String) -> Result<String> {
    let opens = expression.matches('(').count();
    let closes = expression.matches(')').count();

    if closes > opens {
        return Err(CalcError::MismatchedParentheses);
    }
    for _ in closes..opens {
        expression.push(')');
    }
    Ok(expression)
}

/// Split a normalized expression into tokens
pub fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(expression.len());
    let mut chars = expression.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            let mut end = start + c.len_utf8();
            while let Some(&(idx, next)) = chars.peek() {
                if !next.is_ascii_digit() && next != '.' {
                    break;
                }
                end = idx + next.len_utf8();
                chars.next();
            }
            let literal = &expression[start..end];
            let value = literal
                .parse::<f64>()
                .map_err(|_| CalcError::invalid_number(literal))?;
            tokens.push(Token::Number(value));
            continue;
        }

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '%' => Token::Percent,
            _ => match Operator::from_char(c) {
                Some(op) => Token::Op(op),
                None => return Err(CalcError::invalid_characters(c.to_string())),
            },
        };
        tokens.push(token);
    }

    Ok(tokens)
}
