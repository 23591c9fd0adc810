//! finance-calc - amount expression calculator
//!
//! Evaluates what users type as an expense or budget amount: plain numbers,
//! arithmetic with parentheses, and "plus/minus N percent" adjustments.
//!
//! # Example
//!
//! ```rust
//! use finance_calc::{calculate, format_number};
//!
//! assert_eq!(calculate("250").unwrap(), 250.0);
//! assert_eq!(calculate("100 + 10%").unwrap(), 110.0);
//! assert_eq!(calculate("(100-10%)*2-50%").unwrap(), 90.0);
//! assert_eq!(format_number(2.123456789), "2.12346");
//! ```
//!
//! # Syntax
//!
//! | Element | Notes |
//! |---------|-------|
//! | numbers | `.` or `,` as decimal separator, spaces ignored |
//! | `+ - * /` | usual precedence, left-associative |
//! | `^` | binds tighter than `* /`, right-associative |
//! | `( )` | unclosed trailing groups are closed automatically |
//! | `+N%` / `-N%` | N percent of everything to the left at the same nesting level |
//!
//! A percentage after `*`, `/`, `^`, or with nothing to its left is rejected.

pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod numfmt;
pub mod percent;
pub mod postfix;

// Re-exports for convenience
pub use error::{CalcError, ErrorKind, Result};
pub use evaluator::calculate;
pub use numfmt::format_number;
