//! Human-readable number formatting for terminal output.

/// `$1,234.56`; prices under a dollar keep up to six decimals.
pub fn format_currency(value: f64) -> String {
    let decimals = if value.abs() < 1.0 && value != 0.0 { 6 } else { 2 };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(value.abs(), decimals))
}

/// `+1.58%` / `-0.42%`
pub fn format_percentage(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// `$1.26T`, `$31.00B`, `$4.20M`, `$12.50K`; smaller values as currency.
pub fn format_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    for (size, suffix) in UNITS {
        if value.abs() >= size {
            return format!("${:.2}{}", value / size, suffix);
        }
    }
    format_currency(value)
}

/// `1,234,567.89`
pub fn format_number(value: f64, decimals: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(value.abs(), decimals))
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
