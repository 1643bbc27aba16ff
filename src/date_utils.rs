use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait for query params that select a relative time window.
pub trait PeriodFilterable {
    fn period(&self) -> Option<&String>;

    /// Window used when the param is missing or not a known token.
    fn default_period(&self) -> Period {
        Period::default()
    }

    fn resolve_period(&self) -> Period {
        self.period()
            .and_then(|p| p.parse::<Period>().ok())
            .unwrap_or_else(|| self.default_period())
    }
}

/// Named relative time window, counted back from today.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7days")]
    SevenDays,
    #[default]
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "90days")]
    NinetyDays,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "all")]
    All,
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7days" => Ok(Self::SevenDays),
            "30days" => Ok(Self::ThirtyDays),
            "90days" => Ok(Self::NinetyDays),
            "6months" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            "all" => Ok(Self::All),
            _ => Err(()),
        }
    }
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenDays => "7days",
            Self::ThirtyDays => "30days",
            Self::NinetyDays => "90days",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
            Self::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SevenDays => "7 Days",
            Self::ThirtyDays => "30 Days",
            Self::NinetyDays => "90 Days",
            Self::SixMonths => "6 Months",
            Self::OneYear => "1 Year",
            Self::All => "All",
        }
    }

    pub fn all() -> &'static [Period] {
        &[
            Self::SevenDays,
            Self::ThirtyDays,
            Self::NinetyDays,
            Self::SixMonths,
            Self::OneYear,
            Self::All,
        ]
    }

    /// Length of the window in days, `None` for [`Period::All`].
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::SevenDays => Some(7),
            Self::ThirtyDays => Some(30),
            Self::NinetyDays => Some(90),
            Self::SixMonths => Some(180),
            Self::OneYear => Some(365),
            Self::All => None,
        }
    }

    /// Inclusive lower bound of the window ending at `today`. `None` means
    /// unbounded. There is never an upper bound.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|days| today - Duration::days(days))
    }
}

/// Entry of the period selector served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodInfo {
    pub value: Period,
    pub label: &'static str,
}

pub fn period_table() -> Vec<PeriodInfo> {
    Period::all()
        .iter()
        .map(|p| PeriodInfo {
            value: *p,
            label: p.label(),
        })
        .collect()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Strict `YYYY-MM-DD` check: zero padded and a real calendar day.
pub fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok_and(|d| format_date(d) == s)
}

/// Chart label for a `YYYY-MM` key, e.g. `Mar 24`.
pub fn month_label(month_key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", month_key), DATE_FORMAT)
        .map(|d| d.format("%b %y").to_string())
        .unwrap_or_else(|_| month_key.to_string())
}

/// Chart label for a `YYYY-MM-DD` key, e.g. `03-10`.
pub fn day_label(date_key: &str) -> String {
    date_key.get(5..).unwrap_or(date_key).to_string()
}
