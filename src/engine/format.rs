use crate::core::TimeTickUnit;
use crate::core::bar::unix_seconds_to_datetime;
use crate::engine::LabelLocale;

// Magnitudes outside the tick ladder render in scientific notation instead
// of stretching fixed-point labels across the axis.
const SCIENTIFIC_UPPER: f64 = 1e7;
const SCIENTIFIC_LOWER: f64 = 1e-7;

/// Formats a price value with the given fractional digit count and locale.
#[must_use]
pub fn format_price(value: f64, fraction_digits: usize, locale: LabelLocale) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && (magnitude >= SCIENTIFIC_UPPER || magnitude < SCIENTIFIC_LOWER) {
        return format!("{value:e}");
    }

    let rendered = format!("{value:.fraction_digits$}");
    localize_number(&rendered, locale)
}

/// Formats a volume value as a whole number with optional thousands grouping.
#[must_use]
pub fn format_volume(value: f64, locale: LabelLocale) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let rounded = value.round() as i64;
    let rendered = rounded.abs().to_string();
    let grouped = match locale.thousands_separator {
        Some(separator) => group_thousands(&rendered, separator),
        None => rendered,
    };
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a time tick value according to the plan's calendar granularity.
///
/// Major ticks carry the next-coarser unit in the label (the day for hour
/// ticks, the month for day ticks, the year for month ticks).
#[must_use]
pub fn format_time(value: f64, unit: TimeTickUnit, major: bool) -> String {
    let Some(moment) = unix_seconds_to_datetime(value) else {
        return String::new();
    };

    let pattern = match (unit, major) {
        (TimeTickUnit::Hour, false) => "%H:%M",
        (TimeTickUnit::Hour, true) => "%d %b",
        (TimeTickUnit::Day, false) => "%d",
        (TimeTickUnit::Day, true) => "%b",
        (TimeTickUnit::Month, false) => "%b",
        (TimeTickUnit::Month, true) => "%Y",
    };
    moment.format(pattern).to_string()
}

fn localize_number(rendered: &str, locale: LabelLocale) -> String {
    let (integer_part, fraction_part) = match rendered.split_once('.') {
        Some((integer_part, fraction_part)) => (integer_part, Some(fraction_part)),
        None => (rendered, None),
    };

    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", integer_part),
    };

    let grouped = match locale.thousands_separator {
        Some(separator) => group_thousands(digits, separator),
        None => digits.to_owned(),
    };

    match fraction_part {
        Some(fraction) => format!("{sign}{grouped}{}{fraction}", locale.decimal_separator),
        None => format!("{sign}{grouped}"),
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (index + 3 - offset) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
