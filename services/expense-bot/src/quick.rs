//! Single-line expense entry
//!
//! `[date] <expression> [description]`, e.g. `21.03 1 500+10% groceries`.
//! The date is optional (today by default); the expression is the longest
//! prefix made of digits, `. , + - * / % ^` and spaces.

use chrono::NaiveDate;
use finance_calc::{calculate, CalcError};
use regex::Regex;
use thiserror::Error;
use tracing::trace;

use crate::dates::parse_date;
use crate::error::{BotError, Result};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuickEntryError {
    #[error("invalid date format: '{0}', use DD.MM or DD.MM.YYYY")]
    InvalidDate(String),

    #[error("empty expression")]
    EmptyExpression,

    #[error(transparent)]
    Expression(#[from] CalcError),
}

/// Parsed line; never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub expression: String,
    pub description: String,
    pub result: Option<f64>,
    pub error: Option<QuickEntryError>,
}

impl Transaction {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            expression: String::new(),
            description: String::new(),
            result: None,
            error: None,
        }
    }

    fn failed(mut self, error: QuickEntryError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct QuickEntryParser {
    date_prefix: Regex,
    expression: Regex,
    digit_gap: Regex,
}

impl QuickEntryParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| BotError::config(format!("regex {}: {}", pattern, e)))
        };
        Ok(Self {
            date_prefix: compile(r"^(\d{1,2}\.\d{1,2}(?:\.\d{2,4})?)\s+(.*)$")?,
            expression: compile(r"^([0-9.,+\-*/%^ ]*)(.*)$")?,
            digit_gap: compile(r"(\d)\s+(\d)")?,
        })
    }

    pub fn parse(&self, input: &str, today: NaiveDate) -> Transaction {
        let input = input.trim();
        let (date, rest) = match self.split_date(input) {
            Some((token, rest)) => match parse_date(token, today) {
                Some(date) => (date, rest),
                None => {
                    return Transaction::new(today)
                        .failed(QuickEntryError::InvalidDate(token.to_string()))
                },
            },
            None => (today, input),
        };

        let mut tx = Transaction::new(date);
        let (expression, description) = self
            .expression
            .captures(rest)
            .map(|caps| {
                let group = |i| caps.get(i).map_or("", |m| m.as_str());
                (group(1).trim(), group(2).trim())
            })
            .unwrap_or(("", rest));
        tx.expression = expression.to_string();
        tx.description = description.to_string();

        if tx.expression.is_empty() {
            return tx.failed(QuickEntryError::EmptyExpression);
        }

        let compact = self.collapse_digit_gaps(&tx.expression);
        trace!("Quick entry '{}' -> '{}'", tx.expression, compact);
        match calculate(&compact) {
            Ok(value) => tx.result = Some(value),
            Err(err) => return tx.failed(err.into()),
        }
        tx
    }

    /// A leading `D.M[.Y]` token followed by whitespace is always the date
    fn split_date<'a>(&self, input: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.date_prefix.captures(input)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    /// `10 000` -> `10000`
    fn collapse_digit_gaps(&self, expression: &str) -> String {
        let mut current = expression.to_string();
        while self.digit_gap.is_match(&current) {
            current = self.digit_gap.replace_all(&current, "$1$2").into_owned();
        }
        current
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 23).unwrap()
    }

    fn parse(input: &str) -> Transaction {
        QuickEntryParser::new().unwrap().parse(input, today())
    }

    #[test]
    fn test_amount_only() {
        let tx = parse("250");
        assert!(tx.is_ok());
        assert_eq!(tx.date, today());
        assert_eq!(tx.result, Some(250.0));
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_expression_and_description() {
        let tx = parse("  100+10% taxi to airport ");
        assert_eq!(tx.expression, "100+10%");
        assert_eq!(tx.description, "taxi to airport");
        assert_eq!(tx.result, Some(110.0));
    }

    #[test]
    fn test_leading_date() {
        let test_cases = [
            ("21.03 500 food", NaiveDate::from_ymd_opt(2025, 3, 21)),
            ("1.2.24 500 food", NaiveDate::from_ymd_opt(2024, 2, 1)),
            ("01.02.2023 500 food", NaiveDate::from_ymd_opt(2023, 2, 1)),
        ];
        for (input, expected) in test_cases {
            let tx = parse(input);
            assert_eq!(Some(tx.date), expected, "input: {}", input);
            assert_eq!(tx.result, Some(500.0));
            assert_eq!(tx.description, "food");
        }
    }

    #[test]
    fn test_invalid_date_stops() {
        let tx = parse("32.13 500 food");
        assert_eq!(tx.error, Some(QuickEntryError::InvalidDate("32.13".to_string())));
        assert_eq!(tx.result, None);
    }

    #[test]
    fn test_leading_day_month_is_always_a_date() {
        let tx = parse("21.03 coffee");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(tx.error, Some(QuickEntryError::EmptyExpression));
        assert_eq!(tx.result, None);

        let tx = parse("21.03 +5 taxi");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(tx.expression, "+5");
        assert!(matches!(
            tx.error,
            Some(QuickEntryError::Expression(CalcError::MalformedExpression(_)))
        ));
    }

    #[test]
    fn test_decimal_amount_without_space_after() {
        // No whitespace after the token, so it is the amount
        let tx = parse("10.5");
        assert_eq!(tx.date, today());
        assert_eq!(tx.result, Some(10.5));
    }

    #[test]
    fn test_grouped_thousands() {
        let tx = parse("10 000 rent");
        assert_eq!(tx.expression, "10 000");
        assert_eq!(tx.result, Some(10000.0));

        let parser = QuickEntryParser::new().unwrap();
        assert_eq!(parser.collapse_digit_gaps("1 2 3 + 4"), "123 + 4");
    }

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse("12,5 bread").result, Some(12.5));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(parse("coffee").error, Some(QuickEntryError::EmptyExpression));
        assert_eq!(parse("").error, Some(QuickEntryError::EmptyExpression));
    }

    #[test]
    fn test_expression_error_propagates() {
        let tx = parse("100*10% shoes");
        assert!(matches!(
            tx.error,
            Some(QuickEntryError::Expression(CalcError::InvalidPercentUsage(_)))
        ));
        assert!(!tx.is_ok());
    }
}
