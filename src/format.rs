//! Number formatting shared by the window, the HTML report and the PNG axis.

/// `1234567.891` → `1,234,567.89` with `decimals` fraction digits.
pub fn thousands(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `$28,560.18`
pub fn currency(value: f64) -> String {
    let body = thousands(value.abs(), 2);
    if value < 0.0 && body != "0.00" {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Currency, or `n/a` when there is no value.
pub fn currency_or_na(value: Option<f64>) -> String {
    value.map(currency).unwrap_or_else(|| "n/a".to_string())
}
