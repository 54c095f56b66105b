//! Display formatting applied at the render boundary

/// Format a number with thousand separators (e.g., 1234567 -> "1,234,567")
pub fn format_number(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// USD with two decimals and grouping (e.g., 1234.5 -> "$1,234.50")
pub fn format_currency(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Compact short notation for token counts (e.g., 1234 -> "1.2K", 15_000_000 -> "15M")
///
/// One decimal below 10 of a unit, whole units otherwise; trailing ".0"
/// is dropped and a value that rounds up to 1000 moves to the next unit.
pub fn format_compact(n: u64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

    if n < 1000 {
        return n.to_string();
    }

    let value = n as f64;
    let mut unit = UNITS
        .iter()
        .rposition(|(scale, _)| value >= *scale)
        .unwrap_or(0);

    loop {
        let (scale, suffix) = UNITS[unit];
        let scaled = value / scale;
        let text = if scaled < 10.0 {
            format!("{:.1}", scaled)
        } else {
            format!("{:.0}", scaled)
        };
        let text = text.strip_suffix(".0").unwrap_or(&text).to_string();

        let overflowed = text.parse::<f64>().is_ok_and(|v| v >= 1000.0);
        if overflowed && unit + 1 < UNITS.len() {
            unit += 1;
            continue;
        }
        return format!("{}{}", text, suffix);
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}
