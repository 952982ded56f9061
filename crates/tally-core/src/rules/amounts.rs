//! Amount normalization for statement exports in any common locale.
//!
//! The separator convention is decided from the shape of the token alone:
//! `1,234.50`, `1.234,50`, `1,234` and `12,50` all resolve without a locale flag.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Something that can be turned into a signed amount.
pub trait AmountToken {
    fn to_amount(&self) -> Decimal;
}

impl AmountToken for str {
    fn to_amount(&self) -> Decimal {
        parse_amount_text(self)
    }
}

impl AmountToken for &str {
    fn to_amount(&self) -> Decimal {
        parse_amount_text(self)
    }
}

impl AmountToken for String {
    fn to_amount(&self) -> Decimal {
        parse_amount_text(self)
    }
}

impl AmountToken for f64 {
    fn to_amount(&self) -> Decimal {
        if !self.is_finite() {
            return Decimal::ZERO;
        }
        // f64 Display is the shortest round-trip form and never uses exponents.
        Decimal::from_str(&self.to_string()).unwrap_or(Decimal::ZERO)
    }
}

impl AmountToken for i64 {
    fn to_amount(&self) -> Decimal {
        Decimal::from(*self)
    }
}

impl AmountToken for Decimal {
    fn to_amount(&self) -> Decimal {
        *self
    }
}

impl<T: AmountToken> AmountToken for Option<T> {
    fn to_amount(&self) -> Decimal {
        self.as_ref().map(|t| t.to_amount()).unwrap_or(Decimal::ZERO)
    }
}

/// Normalize a raw token into a signed decimal. Never fails; unparseable
/// input is zero.
pub fn normalize<T: AmountToken>(token: T) -> Decimal {
    token.to_amount()
}

fn parse_amount_text(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = resolve_separators(&cleaned);
    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Rewrite `.`/`,` so that only a single `.` decimal point remains.
fn resolve_separators(cleaned: &str) -> String {
    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');

    match (last_comma, last_dot) {
        // Both present: whichever comes last is the decimal point.
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let tail = &cleaned[c + 1..];
            if tail.len() == 2 && tail.chars().all(|ch| ch.is_ascii_digit()) {
                let (head, tail) = cleaned.split_at(c);
                format!("{}.{}", head.replace(',', ""), &tail[1..])
            } else {
                cleaned.replace(',', "")
            }
        }
        // Several dots and no comma can only be digit grouping.
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_us_grouping() {
        assert_eq!(normalize("1,234.50"), dec("1234.50"));
        assert_eq!(normalize("12,345,678.90"), dec("12345678.90"));
    }

    #[test]
    fn test_european_grouping() {
        assert_eq!(normalize("1.234,50"), dec("1234.50"));
        assert_eq!(normalize("1.234.567"), dec("1234567"));
    }

    #[test]
    fn test_single_comma() {
        assert_eq!(normalize("1,234"), dec("1234"));
        assert_eq!(normalize("12,50"), dec("12.50"));
        assert_eq!(normalize("1,00,000"), dec("100000"));
        assert_eq!(normalize("1,234,56"), dec("1234.56"));
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize(""), Decimal::ZERO);
        assert_eq!(normalize(None::<&str>), Decimal::ZERO);
        assert_eq!(normalize("abc"), Decimal::ZERO);
        assert_eq!(normalize("-"), Decimal::ZERO);
    }

    #[test]
    fn test_currency_and_sign() {
        assert_eq!(normalize("₹ -450.00"), dec("-450.00"));
        assert_eq!(normalize("$1,000"), dec("1000"));
        assert_eq!(normalize("INR 99"), dec("99"));
    }

    #[test]
    fn test_numeric_input_is_idempotent() {
        assert_eq!(normalize(1234.5_f64), dec("1234.5"));
        assert_eq!(normalize(normalize(1234.5_f64)), dec("1234.5"));
        assert_eq!(normalize(50000_i64), dec("50000"));
        assert_eq!(normalize(f64::NAN), Decimal::ZERO);
        assert_eq!(normalize(Some(12.25_f64)), dec("12.25"));
    }

    #[test]
    fn test_clean_float_text_is_stable() {
        let once = normalize("450.75");
        assert_eq!(normalize(once.to_string()), once);
    }
}
