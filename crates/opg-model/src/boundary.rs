//! Calendar boundary constants computed once per dataset load.
//!
//! These bound the temporal selections a caller can make: the first year with data, the last
//! year with data at each grain, and the "fringe" secondary values (first quarter/month/week
//! present in the first year, last one present in the last year).

use crate::calendar::{
    quarter_of_month, week_of_year, CalendarEntryType, CalendarFields, CalendarScheme,
    Granularity,
};
use crate::fact::FactRow;
use crate::table::FactTable;
use serde::{Deserialize, Serialize};

/// Last year with data at one grain plus the secondary values at the edges of the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrainBounds {
    pub max_year: i32,
    /// Smallest secondary value present in the calendar's first year.
    pub fringe_min: u32,
    /// Largest secondary value present in `max_year`.
    pub fringe_max: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarBounds {
    pub min_year: i32,
    /// Last year that has whole-year rows.
    pub year_max: i32,
    pub quarter: GrainBounds,
    pub month: GrainBounds,
    pub week: GrainBounds,
    pub week_available: bool,
}

impl CalendarBounds {
    pub fn grain(&self, granularity: Granularity) -> Option<&GrainBounds> {
        match granularity {
            Granularity::Year => None,
            Granularity::Quarter => Some(&self.quarter),
            Granularity::Month => Some(&self.month),
            Granularity::Week => Some(&self.week),
        }
    }
}

/// Default selectable window for one grain. The end bound is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableRange {
    pub start_year: i32,
    pub end_year: i32,
    /// `None` for [`Granularity::Year`].
    pub start_secondary: Option<u32>,
    pub end_secondary: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryConstants {
    pub gregorian: Option<CalendarBounds>,
    /// `None` when the dataset has no fiscal calendar.
    pub fiscal: Option<CalendarBounds>,
}

impl BoundaryConstants {
    pub fn calendar(&self, scheme: CalendarScheme) -> Option<&CalendarBounds> {
        match scheme {
            CalendarScheme::Gregorian => self.gregorian.as_ref(),
            CalendarScheme::Fiscal => self.fiscal.as_ref(),
        }
    }

    pub fn fiscal_available(&self) -> bool {
        self.fiscal.is_some()
    }

    /// Derive the constants from a pre-aggregated table, where each row carries its own
    /// year/quarter/month/week columns and a grain tag.
    pub fn from_table(table: &FactTable) -> Self {
        Self {
            gregorian: calendar_bounds_from_rows(table, CalendarScheme::Gregorian),
            fiscal: calendar_bounds_from_rows(table, CalendarScheme::Fiscal),
        }
    }

    /// Derive the constants from the `Date of Event` span alone.
    ///
    /// Used for datasets that store events rather than roll-ups: every grain shares the last
    /// year of data and the fringes are the quarter/month/week of the first and last dates.
    /// No fiscal calendar is derived.
    pub fn from_date_span(table: &FactTable) -> Self {
        let Some((min, max)) = table.date_span() else {
            return Self::default();
        };
        use chrono::Datelike;

        let grain = |fringe_min: u32, fringe_max: u32| GrainBounds {
            max_year: max.year(),
            fringe_min,
            fringe_max,
        };
        Self {
            gregorian: Some(CalendarBounds {
                min_year: min.year(),
                year_max: max.year(),
                quarter: grain(quarter_of_month(min.month()), quarter_of_month(max.month())),
                month: grain(min.month(), max.month()),
                week: grain(week_of_year(min), week_of_year(max)),
                week_available: true,
            }),
            fiscal: None,
        }
    }

    /// Default selectable window for `granularity`, as offered by a date picker.
    ///
    /// Secondary upper bounds are exclusive. When the last year's fringe already sits at the
    /// unit's natural maximum (quarter 4, month 12, week 52) the exclusive bound rolls over to
    /// secondary 1 of the following year instead of pointing past the end of the year.
    pub fn selectable_range(
        &self,
        scheme: CalendarScheme,
        granularity: Granularity,
    ) -> Option<SelectableRange> {
        let bounds = self.calendar(scheme)?;
        let Some(grain) = bounds.grain(granularity) else {
            // Whole years: the end year is one past the last included year.
            return Some(SelectableRange {
                start_year: bounds.min_year,
                end_year: bounds.year_max + 1,
                start_secondary: None,
                end_secondary: None,
            });
        };
        let natural_max = granularity.natural_max()?;
        let (end_year, end_secondary) = if grain.fringe_max == natural_max {
            (grain.max_year + 1, 1)
        } else {
            (grain.max_year, grain.fringe_max + 1)
        };
        Some(SelectableRange {
            start_year: bounds.min_year,
            end_year,
            start_secondary: Some(grain.fringe_min),
            end_secondary: Some(end_secondary),
        })
    }
}

fn calendar_bounds_from_rows(table: &FactTable, scheme: CalendarScheme) -> Option<CalendarBounds> {
    let fields = |r: &FactRow| *r.calendar(scheme);
    let min_year = table.iter().filter_map(|r| fields(r).year).min()?;

    let max_year_of = |entry: CalendarEntryType| {
        table
            .iter()
            .filter(|r| r.calendar_entry_type == entry)
            .filter_map(|r| fields(r).year)
            .max()
    };
    let overall_max = table.iter().filter_map(|r| fields(r).year).max()?;

    let fringe = |year: i32, pick: fn(&CalendarFields) -> Option<u32>, take_max: bool| {
        let values = table
            .iter()
            .map(fields)
            .filter(|f| f.year == Some(year))
            .filter_map(|f| pick(&f));
        if take_max {
            values.max()
        } else {
            values.min()
        }
    };

    let grain = |entry: CalendarEntryType, pick: fn(&CalendarFields) -> Option<u32>, natural: u32| {
        let max_year = max_year_of(entry).unwrap_or(overall_max);
        GrainBounds {
            max_year,
            fringe_min: fringe(min_year, pick, false).unwrap_or(1),
            fringe_max: fringe(max_year, pick, true).unwrap_or(natural),
        }
    };

    let year_entry = Granularity::Year.entry_type(scheme);
    let year_max = max_year_of(year_entry).unwrap_or(overall_max);
    let quarter = grain(CalendarEntryType::Quarter, |f| f.quarter, 4);
    let month = grain(CalendarEntryType::Month, |f| f.month, 12);

    let week_available = table
        .iter()
        .any(|r| r.calendar_entry_type == CalendarEntryType::Week && fields(r).year.is_some());
    let week = if week_available {
        grain(CalendarEntryType::Week, |f| f.week, 52)
    } else {
        GrainBounds {
            max_year: month.max_year,
            fringe_min: 1,
            fringe_max: 52,
        }
    };

    Some(CalendarBounds {
        min_year,
        year_max,
        quarter,
        month,
        week,
        week_available,
    })
}
