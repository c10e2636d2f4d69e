//! Formatting helpers shared across report renderers.

/// Insert thousands separators into an integer, e.g. `1234567` -> `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dollar amount with separators and two decimals, e.g. `"$1,105.00"`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", format_count(cents / 100), cents % 100)
}

/// Percentage with one decimal, e.g. `"66.7%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Signed percentage change with one decimal, e.g. `"+6.2%"`.
pub fn format_change(value: f64) -> String {
    format!("{value:+.1}%")
}

/// Truncate to `max` characters, appending "..." when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
