//! Expression facade
//!
//! Composes the pipeline stages into a single `calculate` call:
//!
//! 1. normalize (whitespace, case, `,` → `.`)
//! 2. validate the character set
//! 3. close unclosed groups, reject excess `)`
//! 4. rewrite percentages
//! 5. shunting-yard to postfix
//! 6. evaluate the postfix sequence
//!
//! The facade is pure and holds no state between calls.

use crate::error::{CalcError, Result};
use crate::lexer::{balance_parentheses, normalize, render, tokenize, validate_characters};
use crate::percent::transform_percentages;
use crate::postfix::{evaluate_postfix, to_postfix};
use tracing::{debug, trace};

/// Evaluate an amount expression such as `(100-10%)*2-50%`
pub fn calculate(expression: &str) -> Result<f64> {
    let normalized = normalize(expression);
    validate_characters(&normalized)?;
    let balanced = balance_parentheses(normalized)?;

    let tokens = tokenize(&balanced)?;
    let tokens = transform_percentages(&tokens)?;
    trace!(input = expression, rewritten = %render(&tokens), "Percentages resolved");

    let postfix = to_postfix(&tokens)?;
    let value = evaluate_postfix(&postfix)?;

    if !value.is_finite() {
        return Err(CalcError::malformed("result is not a finite number"));
    }

    debug!(input = expression, value, "Expression evaluated");
    Ok(value)
}
