//! Display formatting for tiles, panels, and tables (vi-VN conventions).

use chrono::{Datelike, NaiveDate};

pub fn fixed(value: f64, places: usize) -> String {
    format!("{value:.places$}")
}

pub fn percent(value: f64, places: usize) -> String {
    format!("{}%", fixed(value, places))
}

/// Whole-number display for counts delivered as JSON numbers, grouped the
/// vi-VN way.
pub fn count(value: f64) -> String {
    number_vi(value.round())
}

/// Groups thousands with `.` and uses `,` as decimal separator, keeping at
/// most three fraction digits: `1234567.891` → `1.234.567,891`.
pub fn number_vi(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((&rendered, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (index, digit) in int_part.chars().enumerate() {
        if index > 0 && (int_part.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac_part}")
    }
}

pub fn date_vi(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_precision_and_percent_suffix() {
        assert_eq!(fixed(7.257, 2), "7.26");
        assert_eq!(fixed(0.0, 1), "0.0");
        assert_eq!(percent(81.26, 1), "81.3%");
        assert_eq!(fixed(-0.1234, 3), "-0.123");
    }

    #[test]
    fn counts_round_to_whole_numbers() {
        assert_eq!(count(120.0), "120");
        assert_eq!(count(12.6), "13");
        assert_eq!(count(15234.4), "15.234");
    }

    #[test]
    fn vietnamese_number_grouping() {
        assert_eq!(number_vi(0.0), "0");
        assert_eq!(number_vi(999.0), "999");
        assert_eq!(number_vi(1000.0), "1.000");
        assert_eq!(number_vi(1234567.891), "1.234.567,891");
        assert_eq!(number_vi(-2500.5), "-2.500,5");
        assert_eq!(number_vi(-0.0001), "0");
    }

    #[test]
    fn vietnamese_dates_are_day_first() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).expect("date");
        assert_eq!(date_vi(date), "05/01/2026");
    }
}
