use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// English month names, index 0 = January.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Time-bucketing resolution of the revenue chart.
///
/// Serialized as the lowercase plural (`"days"`, `"quarters"`, ...), which is
/// also the `period` value the statistics endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Days,
    Weeks,
    Months,
    Quarters,
    Years,
}

impl Granularity {
    /// All granularities in select-box order.
    pub const ALL: [Granularity; 5] = [
        Granularity::Days,
        Granularity::Weeks,
        Granularity::Months,
        Granularity::Quarters,
        Granularity::Years,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Days => "days",
            Granularity::Weeks => "weeks",
            Granularity::Months => "months",
            Granularity::Quarters => "quarters",
            Granularity::Years => "years",
        }
    }

    /// Stable position of this granularity, used to seed synthetic data.
    pub fn ordinal(&self) -> u64 {
        match self {
            Granularity::Days => 0,
            Granularity::Weeks => 1,
            Granularity::Months => 2,
            Granularity::Quarters => 3,
            Granularity::Years => 4,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    /// Accepts singular or plural, case-insensitive (`"Day"`, `"weeks"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(Granularity::Days),
            "week" | "weeks" => Ok(Granularity::Weeks),
            "month" | "months" => Ok(Granularity::Months),
            "quarter" | "quarters" => Ok(Granularity::Quarters),
            "year" | "years" => Ok(Granularity::Years),
            other => Err(CoreError::ValidationError(format!(
                "Unknown granularity '{other}'"
            ))),
        }
    }
}

/// The user's current chart selection: a granularity plus the anchor that
/// names which instance of it to show (e.g. `quarters` + `"Q1 2025"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub granularity: Granularity,
    pub anchor: String,
}

impl PeriodSelection {
    pub fn new(granularity: Granularity, anchor: impl Into<String>) -> Self {
        Self {
            granularity,
            anchor: anchor.into(),
        }
    }
}

/// One discrete time unit shown as one data point on the chart.
/// `start` and `end` are both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Earliest year an anchor may name.
pub const MIN_YEAR: i32 = 1;

/// Latest year an anchor may name.
pub const MAX_YEAR: i32 = 9999;

/// A parsed anchor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `month` is 1-based.
    Month { year: i32, month: u32 },
    /// `quarter` is 1-based (1..=4).
    Quarter { year: i32, quarter: u32 },
    Year(i32),
}

impl Anchor {
    /// Parse `text` using the label scheme of `granularity`.
    ///
    /// Returns `None` when the text does not match the scheme, names an
    /// unknown month, or carries a non-numeric or out-of-range year.
    pub fn parse(granularity: Granularity, text: &str) -> Option<Anchor> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        match granularity {
            Granularity::Days | Granularity::Weeks | Granularity::Months => {
                let [month, year] = tokens.as_slice() else {
                    return None;
                };
                Some(Anchor::Month {
                    year: parse_year(year)?,
                    month: parse_month(month)?,
                })
            }
            Granularity::Quarters => {
                let [quarter, year] = tokens.as_slice() else {
                    return None;
                };
                let digits = quarter
                    .strip_prefix('Q')
                    .or_else(|| quarter.strip_prefix('q'))?;
                let quarter: u32 = digits.parse().ok()?;
                if !(1..=4).contains(&quarter) {
                    return None;
                }
                Some(Anchor::Quarter {
                    year: parse_year(year)?,
                    quarter,
                })
            }
            Granularity::Years => {
                let [year] = tokens.as_slice() else {
                    return None;
                };
                Some(Anchor::Year(parse_year(year)?))
            }
        }
    }

    /// The anchor of the same kind that contains `date`.
    pub fn containing(granularity: Granularity, date: NaiveDate) -> Anchor {
        match granularity {
            Granularity::Days | Granularity::Weeks | Granularity::Months => Anchor::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Quarters => Anchor::Quarter {
                year: date.year(),
                quarter: (date.month() - 1) / 3 + 1,
            },
            Granularity::Years => Anchor::Year(date.year()),
        }
    }

    /// The immediately preceding period of the same kind, or `None` when it
    /// would fall before [`MIN_YEAR`].
    pub fn previous(&self) -> Option<Anchor> {
        let previous = match *self {
            Anchor::Month { year, month: 0 | 1 } => Anchor::Month {
                year: year - 1,
                month: 12,
            },
            Anchor::Month { year, month } => Anchor::Month {
                year,
                month: month - 1,
            },
            Anchor::Quarter { year, quarter: 0 | 1 } => Anchor::Quarter {
                year: year - 1,
                quarter: 4,
            },
            Anchor::Quarter { year, quarter } => Anchor::Quarter {
                year,
                quarter: quarter - 1,
            },
            Anchor::Year(year) => Anchor::Year(year - 1),
        };
        (previous.year() >= MIN_YEAR).then_some(previous)
    }

    pub fn year(&self) -> i32 {
        match *self {
            Anchor::Month { year, .. } | Anchor::Quarter { year, .. } | Anchor::Year(year) => year,
        }
    }

    /// First day covered by this anchor.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            Anchor::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            Anchor::Quarter { year, quarter } => {
                NaiveDate::from_ymd_opt(year, 3 * quarter.saturating_sub(1) + 1, 1)
            }
            Anchor::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }

    /// Last day covered by this anchor.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match *self {
            Anchor::Month { year, month } => last_day_of_month(year, month),
            Anchor::Quarter { year, quarter } => last_day_of_month(year, 3 * quarter),
            Anchor::Year(year) => NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Anchor::Month { year, month } => {
                write!(f, "{} {year}", MONTH_NAMES[(month as usize + 11) % 12])
            }
            Anchor::Quarter { year, quarter } => write!(f, "Q{quarter} {year}"),
            Anchor::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Last calendar day of `month` in `year`, via plain chrono arithmetic
/// (first day of the next month minus one day).
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn parse_month(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            name == lower || (lower.len() == 3 && name.starts_with(&lower))
        })
        .map(|idx| idx as u32 + 1)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = token.parse().ok()?;
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_abbreviation_is_accepted() {
        assert_eq!(
            Anchor::parse(Granularity::Days, "nov 2025"),
            Some(Anchor::Month { year: 2025, month: 11 })
        );
    }

    #[test]
    fn partial_month_name_is_rejected() {
        assert_eq!(Anchor::parse(Granularity::Days, "Novem 2025"), None);
    }

    #[test]
    fn nothing_precedes_the_first_year() {
        assert_eq!(Anchor::Month { year: 1, month: 1 }.previous(), None);
        assert_eq!(Anchor::Quarter { year: 1, quarter: 1 }.previous(), None);
        assert_eq!(Anchor::Year(1).previous(), None);
        assert_eq!(
            Anchor::Month { year: 1, month: 2 }.previous(),
            Some(Anchor::Month { year: 1, month: 1 })
        );
    }

    #[test]
    fn signed_year_is_rejected() {
        assert_eq!(parse_year("+2025"), None);
        assert_eq!(parse_year("-1"), None);
    }
}
