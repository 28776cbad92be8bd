//! Number formatting for advice text

use crate::engine::round_half_up;
use crate::models::FinancialMetrics;

/// Integer with comma thousands separators: `-1234567` -> `-1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Rounded rupee amount, e.g. `₹89,100`
pub fn rupees(value: f64) -> String {
    format!("₹{}", group_thousands(round_half_up(value) as i64))
}

pub fn whole(value: f64) -> i64 {
    round_half_up(value) as i64
}

/// Fixed one-decimal rendering used for margins and ratios
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", value)
}

/// "N months", or the infinite marker when profitable
pub fn runway_label(metrics: &FinancialMetrics) -> String {
    match metrics.runway_months() {
        Some(months) => format!("{} months", months),
        None => "∞ (Profitable!)".to_string(),
    }
}

/// Escape user-supplied text before it is embedded in advice markup
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(600_000), "600,000");
        assert_eq!(group_thousands(-283_900), "-283,900");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn test_rupees_rounds_before_grouping() {
        assert_eq!(rupees(89_100.000_000_01), "₹89,100");
        assert_eq!(rupees(1_234.5), "₹1,235");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("<b>\"hi\" & bye</b>"), "&lt;b&gt;&quot;hi&quot; &amp; bye&lt;/b&gt;");
        assert_eq!(escape_markup("plain"), "plain");
    }
}
