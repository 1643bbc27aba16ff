//! Money parsing and formatting.
//!
//! Amounts are carried as integer minor units (cents) everywhere so that
//! summing thousands of records never drifts. Decimal text only exists at the
//! edges: [`parse_cents`] on the way in, the `format_*` helpers on the way out.

/// Largest amount a single record may carry: 100 billion in major units.
///
/// Together with [`MAX_AGGREGATED_RECORDS`] this keeps every running total in
/// range, so the aggregators can sum plain `i64` values.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000_000;

/// Most records a single aggregation may see.
pub const MAX_AGGREGATED_RECORDS: usize = (i64::MAX / MAX_AMOUNT_CENTS) as usize;

/// Parse a non-negative decimal amount such as `"1250"`, `"12.5"` or `"0.99"`
/// into cents.
///
/// At most two fractional digits are accepted; anything finer than a cent is
/// rejected instead of rounded. Amounts above [`MAX_AMOUNT_CENTS`] are
/// rejected.
pub fn parse_cents(input: &str) -> Result<i64, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("Amount is required".into());
    }
    if s.starts_with('-') {
        return Err("Amount must not be negative".into());
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (s, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(format!("Invalid amount: {}", input));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(format!("Invalid amount: {}", input));
    }
    if fraction.len() > 2 {
        return Err(format!(
            "Amount has more than two decimal places: {}",
            input
        ));
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| format!("Amount is too large: {}", input))?
    };
    let fraction_value: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().unwrap_or(0) * 10,
        _ => fraction.parse::<i64>().unwrap_or(0),
    };

    whole_value
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction_value))
        .filter(|cents| *cents <= MAX_AMOUNT_CENTS)
        .ok_or_else(|| format!("Amount is too large: {}", input))
}

/// Format cents with currency symbol and thousands separators, e.g.
/// `-฿1,234.56`. Only negative amounts carry a sign.
pub fn format_money(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}{}", sign, currency_symbol(currency), format_cents(cents.saturating_abs()))
}

/// Format cents as a bare number, e.g. `1,234.56` or `-7.05`.
pub fn format_cents(cents: i64) -> String {
    let is_negative = cents < 0;
    let abs_cents = cents.unsigned_abs();
    let whole = abs_cents / 100;
    let fractional = abs_cents % 100;
    let whole_str = format_with_thousands(whole, ',');

    if is_negative {
        format!("-{}.{:02}", whole_str, fractional)
    } else {
        format!("{}.{:02}", whole_str, fractional)
    }
}

/// Format a share such as `33.3333` as `33.33%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn format_with_thousands(n: u64, sep: char) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }

    result
}

/// Get currency symbol for a currency code.
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_uppercase().as_str() {
        "THB" => "\u{0e3f}",
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{00a3}",
        "JPY" => "\u{00a5}",
        "CNY" => "\u{00a5}",
        "INR" => "\u{20b9}",
        "KRW" => "\u{20a9}",
        "SGD" => "S$",
        "AUD" => "A$",
        "CAD" => "C$",
        _ => "",
    }
}
