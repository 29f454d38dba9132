use rust_decimal::Decimal;

/// Dollar amount with thousands separators and two decimals.
///
/// The sign goes after the dollar sign: `-1234.5` renders as `$-1,234.50`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("${sign}{}.{fraction}", group_thousands(whole))
}

/// A fractional rate as a percentage with one decimal: `0.1` renders as `10.0%`.
pub fn format_percent(rate: Decimal) -> String {
    format!("{:.1}%", (rate * Decimal::ONE_HUNDRED).round_dp(1))
}

/// Like [`format_percent`] for float statistics; `n/a` when undefined.
pub fn format_ratio_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

/// Four decimals, or `n/a` when undefined.
pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
