//! Number formatting shared by the terminal reports.

/// Significant digits printed by the dispatcher.
pub const XSEC_DIGITS: usize = 15;

/// Format `value` with `digits` significant digits, trailing zeros removed.
///
/// Fixed notation is used for decimal exponents in `-5 < exp < digits`,
/// scientific notation (`1.5e-9`, `2.0e+20`) otherwise. The mantissa always
/// keeps at least one fractional digit.
pub fn format_significant(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    let digits = digits.max(1);
    let formatted = format!("{:.*e}", digits - 1, value.abs());
    let Some((mantissa, exp)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return formatted;
    };
    let sign = if value < 0.0 { "-" } else { "" };
    let mantissa_digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if -5 < exp && exp < digits as i32 {
        let body = if exp < 0 {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), mantissa_digits)
        } else {
            let split = (exp + 1) as usize;
            format!("{}.{}", &mantissa_digits[..split], &mantissa_digits[split..])
        };
        format!("{sign}{}", strip_fraction_zeros(&body))
    } else {
        let body = format!("{}.{}", &mantissa_digits[..1], &mantissa_digits[1..]);
        let exp_sign = if exp >= 0 { "+" } else { "" };
        format!("{sign}{}e{exp_sign}{exp}", strip_fraction_zeros(&body))
    }
}

fn strip_fraction_zeros(s: &str) -> String {
    let trimmed = s.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_range() {
        assert_eq!(format_significant(250.0, 15), "250.0");
        assert_eq!(format_significant(0.1, 15), "0.1");
        assert_eq!(format_significant(-1.5, 15), "-1.5");
        assert_eq!(format_significant(0.00012345, 15), "0.00012345");
        assert_eq!(format_significant(1.0 / 3.0, 15), "0.333333333333333");
    }

    #[test]
    fn scientific_range() {
        assert_eq!(format_significant(1.5e-9, 15), "1.5e-9");
        assert_eq!(format_significant(1.2e-5, 15), "1.2e-5");
        assert_eq!(format_significant(2.0e20, 15), "2.0e+20");
        assert_eq!(format_significant(1.0e15, 15), "1.0e+15");
    }

    #[test]
    fn rounding_can_shift_the_exponent() {
        assert_eq!(format_significant(9.99999, 3), "10.0");
        assert_eq!(format_significant(0.0, 15), "0.0");
    }
}
