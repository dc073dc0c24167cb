use chrono::{DateTime, Utc};

/// Escape user-provided text for Telegram's legacy Markdown parse mode.
///
/// Only `_`, `*`, `` ` `` and `[` are entities in that mode.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Timestamp as shown in chat replies, e.g. `2026-01-31 14:05 UTC`.
pub fn display_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Format a premium amount with thousands separators, e.g. `$12,345.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}
