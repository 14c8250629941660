//! Publication-date normalization for PubMed `PubDate` fragments.
//!
//! PubMed dates arrive in pieces (`Year`, `Month`, `Day`) and the month may
//! be an abbreviation ("Mar"), a number ("3"), or junk. Malformed or missing
//! month/day data must never abort parsing of an otherwise-valid record, so
//! every fallback here is `"01"`, not an error.

const MONTHS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

/// Convert a month token to a two-digit string in `"01"..="12"`.
///
/// Abbreviation matching is case-sensitive; numeric strings outside `[1,12]`
/// fall back to `"01"` like everything else unparseable.
pub fn month_to_number(token: &str) -> String {
    if let Some((_, number)) = MONTHS.iter().find(|(name, _)| *name == token) {
        return (*number).to_string();
    }
    match token.trim().parse::<u32>() {
        Ok(n) if (1..=12).contains(&n) => format!("{n:02}"),
        _ => "01".to_string(),
    }
}

/// Zero-pad a day-of-month token, falling back to `"01"`.
pub fn day_to_number(token: &str) -> String {
    match token.trim().parse::<u32>() {
        Ok(n) => format!("{n:02}"),
        Err(_) => "01".to_string(),
    }
}

/// Assemble `YYYY-MM-DD`. A date exists only when a year is present; month
/// and day default to `"01"` when the year exists but they do not.
pub fn format_pub_date(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
) -> Option<String> {
    let year = year.map(str::trim).filter(|y| !y.is_empty())?;
    let month = month.map(month_to_number).unwrap_or_else(|| "01".to_string());
    let day = day.map(day_to_number).unwrap_or_else(|| "01".to_string());
    Some(format!("{year}-{month}-{day}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_abbreviations_map_exactly() {
        for (name, number) in MONTHS {
            assert_eq!(month_to_number(name), number);
        }
    }

    #[test]
    fn month_numeric_strings_are_zero_padded() {
        assert_eq!(month_to_number("3"), "03");
        assert_eq!(month_to_number("12"), "12");
        assert_eq!(month_to_number("1"), "01");
    }

    #[test]
    fn month_fallback_is_january() {
        assert_eq!(month_to_number(""), "01");
        assert_eq!(month_to_number("0"), "01");
        assert_eq!(month_to_number("13"), "01");
        assert_eq!(month_to_number("March"), "01");
        assert_eq!(month_to_number("jan"), "01");
        assert_eq!(month_to_number("-2"), "01");
    }

    #[test]
    fn day_is_zero_padded_with_fallback() {
        assert_eq!(day_to_number("5"), "05");
        assert_eq!(day_to_number("15"), "15");
        assert_eq!(day_to_number(""), "01");
        assert_eq!(day_to_number("x"), "01");
    }

    #[test]
    fn date_requires_a_year() {
        assert_eq!(format_pub_date(None, Some("Mar"), Some("15")), None);
        assert_eq!(format_pub_date(Some(""), Some("Mar"), None), None);
    }

    #[test]
    fn date_defaults_missing_month_and_day() {
        assert_eq!(
            format_pub_date(Some("2021"), Some("Mar"), Some("15")).as_deref(),
            Some("2021-03-15")
        );
        assert_eq!(
            format_pub_date(Some("2020"), None, None).as_deref(),
            Some("2020-01-01")
        );
        assert_eq!(
            format_pub_date(Some("2019"), Some("Nov"), None).as_deref(),
            Some("2019-11-01")
        );
    }
}
