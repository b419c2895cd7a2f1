//! Partial-precision dates used by employments and educations.
//!
//! A date is either year-only or year+month. Ordering between the two is
//! three-valued: when the years match and one side has no month, there is not
//! enough information to decide, and `is_before` says so instead of guessing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Could not parse date `{input}`: expected \"<month> <year>\" or \"<year>\"")]
pub struct DateParseError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Lowercase name, as used in profiles and in the generation schema.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }

    pub fn capitalized(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn from_name(name: &str) -> Option<Month> {
        Month::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// A date with year or year+month precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateRepr", into = "DateFields")]
pub enum Date {
    Year { year: u32 },
    YearMonth { year: u32, month: Month },
}

impl Date {
    pub fn year(&self) -> u32 {
        match self {
            Date::Year { year } | Date::YearMonth { year, .. } => *year,
        }
    }

    pub fn month(&self) -> Option<Month> {
        match self {
            Date::Year { .. } => None,
            Date::YearMonth { month, .. } => Some(*month),
        }
    }

    /// Parses `"<month> <year>"` or `"<year>"`, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Date, DateParseError> {
        let sanitized = input.trim().to_lowercase();
        let tokens: Vec<&str> = sanitized.split_whitespace().collect();

        let parsed = match tokens.as_slice() {
            [year] => parse_year(year).map(|year| Date::Year { year }),
            [month, year] => Month::from_name(month)
                .zip(parse_year(year))
                .map(|(month, year)| Date::YearMonth { year, month }),
            _ => None,
        };

        parsed.ok_or_else(|| DateParseError {
            input: input.to_string(),
        })
    }
}

fn parse_year(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl FromStr for Date {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Date::Year { year } => write!(f, "{year}"),
            Date::YearMonth { year, month } => write!(f, "{} {year}", month.capitalized()),
        }
    }
}

/// Accepted input shapes: a free-text string, a bare year or a `{year, month?}` map.
///
/// Month names are only checked on conversion, so an unknown month is a
/// `DateParseError` rather than a shape mismatch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DateRepr {
    Text(String),
    Year(u32),
    Fields {
        year: u32,
        #[serde(default)]
        month: Option<String>,
    },
}

#[derive(Serialize)]
struct DateFields {
    year: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<Month>,
}

impl TryFrom<DateRepr> for Date {
    type Error = DateParseError;

    fn try_from(repr: DateRepr) -> Result<Self, Self::Error> {
        match repr {
            DateRepr::Text(text) => Date::parse(&text),
            DateRepr::Year(year) => Ok(Date::Year { year }),
            DateRepr::Fields { year, month: None } => Ok(Date::Year { year }),
            DateRepr::Fields {
                year,
                month: Some(month),
            } => Month::from_name(&month.trim().to_lowercase())
                .map(|month| Date::YearMonth { year, month })
                .ok_or_else(|| DateParseError {
                    input: format!("{month} {year}"),
                }),
        }
    }
}

impl From<Date> for DateFields {
    fn from(date: Date) -> Self {
        DateFields {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Result of [`is_before`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Before,
    After,
    /// Not enough precision to order the two dates.
    Indeterminate,
}

/// Whether `a` strictly precedes `b`.
///
/// Years decide when they differ. Equal years decide only when both dates carry
/// a month and the months differ; everything else is `Indeterminate`.
pub fn is_before(a: &Date, b: &Date) -> DateOrder {
    use std::cmp::Ordering;

    match a.year().cmp(&b.year()) {
        Ordering::Less => return DateOrder::Before,
        Ordering::Greater => return DateOrder::After,
        Ordering::Equal => {}
    }

    match (a.month(), b.month()) {
        (Some(month_a), Some(month_b)) => match month_a.cmp(&month_b) {
            Ordering::Less => DateOrder::Before,
            Ordering::Greater => DateOrder::After,
            Ordering::Equal => DateOrder::Indeterminate,
        },
        _ => DateOrder::Indeterminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_parse_month_year() {
        assert_eq!(
            d("march 2020"),
            Date::YearMonth {
                year: 2020,
                month: Month::March
            }
        );
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(d("  SePtember   2018 "), d("september 2018"));
        assert_eq!(d(" 1999\n"), Date::Year { year: 1999 });
    }

    #[test]
    fn test_parse_rejects_unknown_patterns() {
        for bad in ["", "2020 march", "marc 2020", "march", "march 20x0", "-2020", "1 2 3"] {
            let err = Date::parse(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn test_every_month_renders_capitalized() {
        for month in Month::ALL {
            let date = d(&format!("{} 2021", month.name()));
            let expected = format!("{} 2021", month.capitalized());
            assert_eq!(date.to_string(), expected);
            assert!(expected.chars().next().unwrap().is_uppercase());
        }
        assert_eq!(d("2021").to_string(), "2021");
    }

    #[test]
    fn test_year_decides_when_different() {
        assert_eq!(is_before(&d("december 2019"), &d("january 2020")), DateOrder::Before);
        assert_eq!(is_before(&d("2021"), &d("march 2020")), DateOrder::After);
        assert_eq!(is_before(&d("2019"), &d("2020")), DateOrder::Before);
    }

    #[test]
    fn test_month_decides_when_both_present() {
        assert_eq!(is_before(&d("january 2020"), &d("march 2020")), DateOrder::Before);
        assert_eq!(is_before(&d("march 2020"), &d("january 2020")), DateOrder::After);
    }

    #[test]
    fn test_indeterminate_cases() {
        assert_eq!(is_before(&d("2020"), &d("march 2020")), DateOrder::Indeterminate);
        assert_eq!(is_before(&d("march 2020"), &d("2020")), DateOrder::Indeterminate);
        assert_eq!(is_before(&d("2020"), &d("2020")), DateOrder::Indeterminate);
        assert_eq!(is_before(&d("may 2020"), &d("may 2020")), DateOrder::Indeterminate);
    }

    #[test]
    fn test_is_before_antisymmetric_where_decisive() {
        let mut dates: Vec<Date> = vec![d("2019"), d("2020"), d("2021")];
        dates.extend(Month::ALL.iter().map(|m| d(&format!("{} 2020", m.name()))));

        for a in &dates {
            for b in &dates {
                if is_before(a, b) == DateOrder::Before {
                    assert_ne!(is_before(b, a), DateOrder::Before, "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn test_deserialize_from_string_and_map() {
        let from_text: Date = serde_json::from_str(r#""April 2017""#).unwrap();
        let from_map: Date = serde_json::from_str(r#"{"year": 2017, "month": "april"}"#).unwrap();
        let year_only: Date = serde_json::from_str(r#"{"year": 2017}"#).unwrap();

        assert_eq!(from_text, from_map);
        assert_eq!(year_only, Date::Year { year: 2017 });
        assert_eq!(serde_json::from_str::<Date>("2017").unwrap(), year_only);
        assert!(serde_json::from_str::<Date>(r#""someday""#).is_err());
        assert!(serde_json::from_str::<Date>(r#"{"year": 2017, "month": "smarch"}"#).is_err());
    }

    #[test]
    fn test_unknown_month_in_map_is_a_parse_error() {
        let repr: DateRepr = serde_json::from_str(r#"{"year": 2017, "month": "smarch"}"#).unwrap();
        let err = Date::try_from(repr).unwrap_err();
        assert_eq!(err.input, "smarch 2017");

        let repr: DateRepr = serde_json::from_str(r#"{"year": 2017, "month": "April"}"#).unwrap();
        assert_eq!(Date::try_from(repr).unwrap(), d("april 2017"));
    }

    #[test]
    fn test_serialize_as_map() {
        assert_eq!(
            serde_json::to_value(d("june 2015")).unwrap(),
            serde_json::json!({"year": 2015, "month": "june"})
        );
        assert_eq!(
            serde_json::to_value(d("2015")).unwrap(),
            serde_json::json!({"year": 2015})
        );
    }
}
