use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which calendar the year/secondary columns of a query refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalendarScheme {
    #[default]
    Gregorian,
    Fiscal,
}

/// Temporal resolution of a row or a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    Year,
    Quarter,
    Month,
    Week,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Year,
        Granularity::Quarter,
        Granularity::Month,
        Granularity::Week,
    ];

    /// Largest value the secondary unit takes within one year (`None` for [`Granularity::Year`],
    /// which has no secondary unit).
    pub fn natural_max(self) -> Option<u32> {
        match self {
            Granularity::Year => None,
            Granularity::Quarter => Some(4),
            Granularity::Month => Some(12),
            Granularity::Week => Some(52),
        }
    }

    /// The `Calendar Entry Type` tag carried by native rows of this grain.
    ///
    /// Only whole-year rows are tagged differently per calendar; quarter, month and week rows
    /// share their tag between the Gregorian and fiscal calendars.
    pub fn entry_type(self, calendar: CalendarScheme) -> CalendarEntryType {
        match (self, calendar) {
            (Granularity::Year, CalendarScheme::Gregorian) => CalendarEntryType::Year,
            (Granularity::Year, CalendarScheme::Fiscal) => CalendarEntryType::FiscalYear,
            (Granularity::Quarter, _) => CalendarEntryType::Quarter,
            (Granularity::Month, _) => CalendarEntryType::Month,
            (Granularity::Week, _) => CalendarEntryType::Week,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Year => "Year",
            Granularity::Quarter => "Quarter",
            Granularity::Month => "Month",
            Granularity::Week => "Week",
        };
        f.write_str(s)
    }
}

/// Native grain tag stored on each row.
///
/// Upstream dataset variants do not agree on the full tag vocabulary, so unrecognized tags are
/// preserved as [`CalendarEntryType::Unknown`] and never match a query grain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CalendarEntryType {
    Year,
    FiscalYear,
    Quarter,
    Month,
    Week,
    Unknown(String),
}

impl CalendarEntryType {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "Year" => CalendarEntryType::Year,
            "Fiscal Year" => CalendarEntryType::FiscalYear,
            "Quarter" => CalendarEntryType::Quarter,
            "Month" => CalendarEntryType::Month,
            "Week" => CalendarEntryType::Week,
            other => CalendarEntryType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CalendarEntryType::Year => "Year",
            CalendarEntryType::FiscalYear => "Fiscal Year",
            CalendarEntryType::Quarter => "Quarter",
            CalendarEntryType::Month => "Month",
            CalendarEntryType::Week => "Week",
            CalendarEntryType::Unknown(tag) => tag,
        }
    }

    pub fn granularity(&self) -> Option<Granularity> {
        match self {
            CalendarEntryType::Year | CalendarEntryType::FiscalYear => Some(Granularity::Year),
            CalendarEntryType::Quarter => Some(Granularity::Quarter),
            CalendarEntryType::Month => Some(Granularity::Month),
            CalendarEntryType::Week => Some(Granularity::Week),
            CalendarEntryType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for CalendarEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CalendarEntryType {
    fn from(value: &str) -> Self {
        CalendarEntryType::parse(value)
    }
}

impl Serialize for CalendarEntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CalendarEntryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(CalendarEntryType::parse(&tag))
    }
}

/// Year/quarter/month/week columns for one calendar scheme.
///
/// Every field is nullable: year rows have no quarter, synthesized rows have no week, and
/// datasets without a fiscal calendar leave the fiscal set empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFields {
    pub year: Option<i32>,
    pub quarter: Option<u32>,
    pub month: Option<u32>,
    pub week: Option<u32>,
}

impl CalendarFields {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    pub fn quarter(year: i32, quarter: u32) -> Self {
        Self {
            year: Some(year),
            quarter: Some(quarter),
            ..Self::default()
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            quarter: Some(quarter_of_month(month)),
            month: Some(month),
            week: None,
        }
    }

    pub fn week(year: i32, month: u32, week: u32) -> Self {
        Self {
            week: Some(week),
            ..Self::month(year, month)
        }
    }

    /// Value of the secondary unit used to clip boundary years for `granularity`.
    pub fn secondary(&self, granularity: Granularity) -> Option<u32> {
        match granularity {
            Granularity::Year => None,
            Granularity::Quarter => self.quarter,
            Granularity::Month => self.month,
            Granularity::Week => self.week,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.quarter.is_none() && self.month.is_none() && self.week.is_none()
    }
}

/// Quarter index (1-4) containing a 1-based month.
pub fn quarter_of_month(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

pub fn last_day_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month.checked_add(1)?)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

pub fn last_day_of_quarter(year: i32, quarter: u32) -> Option<NaiveDate> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    last_day_of_month(year, quarter * 3)
}

/// Monday-based week number, `strftime("%W") + 1`: days before the first Monday of the year
/// are week 1.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let days_from_monday = date.weekday().num_days_from_monday();
    (date.ordinal0() + 7 - days_from_monday) / 7 + 1
}
