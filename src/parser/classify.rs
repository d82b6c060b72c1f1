use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Month, NaiveDate, Weekday};
use regex::Regex;

static PARTIAL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})[/\-.](\d{1,2})$").unwrap());
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/\-.](\d{4})$").unwrap());
static NAMED_MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3,9})\.?[/\-.](\d{2}|\d{4})$").unwrap());
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,3})$").unwrap());
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap());
static MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)$").unwrap());
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})(st|nd|rd|th)$").unwrap());

/// Full-date layouts accepted for a single token, tried in order.
/// Month-first wins over day-first for ambiguous values like `01/02/2023`.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d/%m/%y", "%Y/%m/%d", "%Y-%m-%d", "%m-%d-%Y",
    "%m-%d-%y", "%d-%m-%Y", "%d.%m.%Y", "%m.%d.%Y", "%Y.%m.%d", "%Y%m%d", "%d-%b-%Y",
    "%d-%b-%y", "%b-%d-%Y", "%d%b%Y",
];

/// Category of the first whitespace-delimited token of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadToken {
    Date,
    Text,
    /// Line has no tokens at all.
    Missing,
}

pub fn lead_token(line: &str) -> LeadToken {
    match line.split_whitespace().next() {
        None => LeadToken::Missing,
        Some(tok) if is_date_like(tok) => LeadToken::Date,
        Some(_) => LeadToken::Text,
    }
}

/// Lenient day/month/year check for a single token.
///
/// Accepts full dates in the common numeric layouts, partial `m/d` and
/// `m/yyyy` dates, bare numbers up to 9999 (day or year), fractional
/// numbers, clock times, ordinals, and month or weekday names.
pub fn is_date_like(token: &str) -> bool {
    let tok = token.trim().trim_end_matches(',');
    if tok.is_empty() {
        return false;
    }

    if tok.bytes().all(|b| b.is_ascii_digit()) {
        return bare_number_is_date(tok);
    }

    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(tok, fmt).is_ok())
    {
        return true;
    }

    if let Some(caps) = PARTIAL_DATE_RE.captures(tok) {
        let a = number(&caps[1]);
        let b = number(&caps[2]);
        if (1..=12).contains(&a) && (1..=31).contains(&b)
            || (1..=31).contains(&a) && (1..=12).contains(&b)
            || caps[1].len() == 4 && (1..=12).contains(&b)
        {
            return true;
        }
    }

    if let Some(caps) = MONTH_YEAR_RE.captures(tok) {
        return (1..=12).contains(&number(&caps[1])) && number(&caps[2]) >= 1;
    }

    if let Some(caps) = DECIMAL_RE.captures(tok) {
        // `10.000` is a share count, `1.500` reads as a time of day.
        return number(&caps[2]) != 0 && number(&caps[1]) < 60;
    }

    if let Some(caps) = TIME_RE.captures(tok) {
        let seconds_ok = caps.get(3).map_or(true, |s| number(s.as_str()) < 60);
        return number(&caps[1]) < 24 && number(&caps[2]) < 60 && seconds_ok;
    }

    if let Some(caps) = MERIDIEM_RE.captures(tok) {
        let minutes_ok = caps.get(2).map_or(true, |m| number(m.as_str()) < 60);
        return (1..=12).contains(&number(&caps[1])) && minutes_ok;
    }

    if let Some(caps) = ORDINAL_RE.captures(tok) {
        return (1..=31).contains(&number(&caps[1]));
    }

    if let Some(caps) = NAMED_MONTH_YEAR_RE.captures(tok) {
        return Month::from_str(&caps[1]).is_ok();
    }

    let word = tok.trim_end_matches('.');
    Month::from_str(word).is_ok() || Weekday::from_str(word).is_ok()
}

fn number(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

fn bare_number_is_date(digits: &str) -> bool {
    match digits.len() {
        // Day of month, or a year.
        1..=4 => number(digits) >= 1,
        6 => NaiveDate::parse_from_str(digits, "%m%d%y").is_ok()
            || NaiveDate::parse_from_str(digits, "%y%m%d").is_ok(),
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d").is_ok()
            || NaiveDate::parse_from_str(digits, "%m%d%Y").is_ok(),
        _ => false,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_dates() {
        for tok in ["01/02/2023", "1/2/23", "2023-01-02", "31/12/2023", "12-31-2023", "20230102"] {
            assert!(is_date_like(tok), "{tok} should be a date");
        }
    }

    #[test]
    fn partial_and_named_dates() {
        assert!(is_date_like("01/02"));
        assert!(is_date_like("Jan"));
        assert!(is_date_like("december"));
        assert!(is_date_like("15"));
        assert!(is_date_like("2023"));
        assert!(is_date_like("5/2023"));
        assert!(is_date_like("Jan-2023"));
        assert!(is_date_like("1st"));
        assert!(is_date_like("Friday"));
    }

    #[test]
    fn bare_numbers_read_as_day_or_year() {
        for tok in ["1", "31", "45", "99", "100", "123", "999", "1000", "9999"] {
            assert!(is_date_like(tok), "{tok} should be a date");
        }
        for tok in ["0", "00", "12345"] {
            assert!(!is_date_like(tok), "{tok} should be text");
        }
    }

    #[test]
    fn fractions_and_times() {
        for tok in ["1.500", "2.5", "12.5", "10:30", "23:59:59", "3pm", "11AM"] {
            assert!(is_date_like(tok), "{tok} should be a date");
        }
        for tok in ["10.000", "24:00", "10:75", "13pm", "1000.00"] {
            assert!(!is_date_like(tok), "{tok} should be text");
        }
    }

    #[test]
    fn text_tokens() {
        for tok in ["Symbol", "Sale", "Total", "AAPL", "APPLE", "...", "1,000.00", "13/13/2023", "0", "12345", "10.000", "Sale-2023"] {
            assert!(!is_date_like(tok), "{tok} should be text");
        }
    }

    #[test]
    fn lead_token_of_line() {
        assert_eq!(lead_token("01/02/2023 10 1000.00"), LeadToken::Date);
        assert_eq!(lead_token("  Symbol 01/02/2023"), LeadToken::Text);
        assert_eq!(lead_token("45 10 1000.00 01/01/2023"), LeadToken::Date);
        assert_eq!(lead_token("   "), LeadToken::Missing);
        assert_eq!(lead_token(""), LeadToken::Missing);
    }
}
