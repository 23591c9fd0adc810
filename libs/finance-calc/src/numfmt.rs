//! Amount formatting
//!
//! Uses `itoa` for whole amounts and `ryu` for fractional ones, so the
//! shortest decimal that round-trips is printed.

/// Whole values beyond this are printed through `Display` instead of `itoa`
const I64_SAFE_LIMIT: f64 = 9.0e18;

/// Round to 5 decimal places and print without trailing zeros
///
/// `5.0` → `"5"`, `2.123456789` → `"2.12346"`.
pub fn format_number(amount: f64) -> String {
    let rounded = (amount * 1e5).round() / 1e5;

    // Also folds -0.0
    if rounded == 0.0 {
        return "0".to_string();
    }

    if rounded.fract() == 0.0 {
        if rounded.abs() < I64_SAFE_LIMIT {
            let mut buffer = itoa::Buffer::new();
            return buffer.format(rounded as i64).to_string();
        }
        return format!("{:.0}", rounded);
    }

    let mut buffer = ryu::Buffer::new();
    let formatted = buffer.format(rounded);
    if formatted.contains('e') {
        // ryu switches to exponent notation for very small magnitudes
        rounded.to_string()
    } else {
        formatted.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        let test_cases = [
            (5.0, "5"),
            (3.1415926535, "3.14159"),
            (2.0000000001, "2"),
            (2.123456789, "2.12346"),
            (0.1 + 0.2, "0.3"),
            (-12.5, "-12.5"),
            (-0.000001, "0"),
            (0.00001, "0.00001"),
            (1_000_000.0, "1000000"),
            (1e21, "1000000000000000000000"),
        ];

        for (input, expected) in test_cases {
            assert_eq!(format_number(input), expected, "Failed for input: {}", input);
        }
    }
}
