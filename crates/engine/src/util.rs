//! Internal helpers for date/time display strings and lenient number parsing.
//!
//! These utilities are **not** part of the public API. They centralize the
//! string formats the stored blobs rely on, so every read path produces the
//! same shapes.

use chrono::NaiveTime;

/// Format a wall-clock time as the 4-digit `HHMM` string stamped on events.
pub(crate) fn hhmm(time: NaiveTime) -> String {
    time.format("%H%M").to_string()
}

/// Build the `DD/MM/YYYY HH:MM` display string from a day key (`YYYY-MM-DD`)
/// and an event time (`HHMM`).
///
/// Both inputs are zero-padded fixed-width strings, which keeps lexicographic
/// order of the result aligned with chronological order. Inputs that do not
/// match the expected widths fall back to a raw join instead of slicing.
pub(crate) fn display_date_time(date: &str, time: &str) -> String {
    match (
        date.get(8..10),
        date.get(5..7),
        date.get(0..4),
        time.get(0..2),
        time.get(2..4),
    ) {
        (Some(day), Some(month), Some(year), Some(hour), Some(minute)) => {
            format!("{day}/{month}/{year} {hour}:{minute}")
        }
        _ => format!("{date} {time}"),
    }
}

/// Lenient amount normalization used at every aggregation boundary.
///
/// A present, non-zero `amount` wins; otherwise the leading digit run of
/// the display string is parsed and any non-numeric remnant is dropped;
/// anything else is zero. Historical records carry amounts in either field,
/// so both paths stay load-bearing.
pub(crate) fn lenient_amount(amount: Option<i64>, formatted: Option<&str>) -> i64 {
    match amount {
        Some(value) if value != 0 => value,
        _ => formatted.map(leading_int).unwrap_or(0),
    }
}

/// Parse a stringified integer the way the wallet balance is stored, or 0.
pub(crate) fn leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed),
    };
    let run: String = digits.chars().take_while(char::is_ascii_digit).collect();
    run.parse::<i64>().map(|v| sign * v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_date_time_reorders_day_first() {
        assert_eq!(display_date_time("2025-10-30", "0730"), "30/10/2025 07:30");
        assert_eq!(display_date_time("2025-01-05", "2359"), "05/01/2025 23:59");
    }

    #[test]
    fn display_date_time_tolerates_short_inputs() {
        assert_eq!(display_date_time("2025", "07"), "2025 07");
    }

    #[test]
    fn lenient_amount_prefers_numeric_field() {
        assert_eq!(lenient_amount(Some(30000), Some("25,000")), 30000);
    }

    #[test]
    fn lenient_amount_falls_back_to_display_string() {
        assert_eq!(lenient_amount(None, Some("30,000")), 30);
        assert_eq!(lenient_amount(Some(0), Some("25000đ")), 25000);
        assert_eq!(lenient_amount(None, Some("abc")), 0);
        assert_eq!(lenient_amount(None, None), 0);
    }

    #[test]
    fn leading_int_parses_stored_balances() {
        assert_eq!(leading_int("150000"), 150000);
        assert_eq!(leading_int("-5"), -5);
        assert_eq!(leading_int(""), 0);
    }
}
