//! Temporal range resolution.
//!
//! [`resolve`] is a pure function of the selection, the dataset's boundary constants and the
//! current time; the resulting [`TimeWindow`] is then evaluated row by row.

use crate::selection::{PeriodType, TimeSelection};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use opg_model::{BoundaryConstants, CalendarScheme, FactRow, FactTable, Granularity};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A resolved temporal predicate over fact rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimeWindow {
    /// Rows of `granularity` with year in `[start_year, end_year]`. In the first year the
    /// secondary unit must be `>= start_secondary`; in the last year it must be
    /// `< end_secondary`. Interior years are not clipped.
    #[serde(rename_all = "camelCase")]
    Range {
        calendar: CalendarScheme,
        granularity: Granularity,
        start_year: i32,
        end_year: i32,
        start_secondary: Option<u32>,
        end_secondary: Option<u32>,
    },
    /// Whole-year rows with year in `[start_year, last_year]`.
    #[serde(rename_all = "camelCase")]
    Years {
        calendar: CalendarScheme,
        start_year: i32,
        last_year: i32,
    },
    /// Rows of `granularity` with `Date of Event` in `[start, end]`.
    #[serde(rename_all = "camelCase")]
    Trailing {
        calendar: CalendarScheme,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
        /// Number of periods after clamping to the dataset's history.
        num_periods: u32,
    },
    /// Matches nothing.
    Empty,
}

pub fn resolve(
    selection: &TimeSelection,
    bounds: &BoundaryConstants,
    now: NaiveDateTime,
) -> TimeWindow {
    let window = match *selection {
        TimeSelection::AllTime { calendar } => match bounds.calendar(calendar) {
            Some(cal) => TimeWindow::Range {
                calendar,
                granularity: Granularity::Month,
                start_year: cal.min_year,
                end_year: cal.month.max_year,
                start_secondary: Some(cal.month.fringe_min),
                end_secondary: Some(cal.month.fringe_max + 1),
            },
            None => no_bounds(calendar),
        },
        TimeSelection::ToCurrent {
            calendar,
            num_periods,
            period_type,
        } => match bounds.calendar(calendar) {
            Some(cal) => {
                let clamped = clamp_periods(num_periods, period_type, cal.min_year, now.year());
                if clamped != num_periods {
                    log::debug!(
                        "clamped {num_periods} {period_type:?} to {clamped} (history starts {})",
                        cal.min_year
                    );
                }
                TimeWindow::Trailing {
                    calendar,
                    granularity: period_type.granularity(),
                    start: period_start(now, clamped, period_type).date(),
                    end: now.date(),
                    num_periods: clamped,
                }
            }
            None => no_bounds(calendar),
        },
        TimeSelection::SelectRange {
            calendar,
            granularity: Granularity::Year,
            start_year,
            end_year,
            ..
        } => TimeWindow::Years {
            calendar,
            start_year,
            last_year: end_year.saturating_sub(1),
        },
        TimeSelection::SelectRange {
            calendar,
            granularity,
            start_year,
            end_year,
            start_secondary,
            end_secondary,
        } => TimeWindow::Range {
            calendar,
            granularity,
            start_year,
            end_year,
            start_secondary,
            end_secondary,
        },
    };
    log::debug!("resolved {selection:?} to {window:?}");
    window
}

fn no_bounds(calendar: CalendarScheme) -> TimeWindow {
    log::debug!("dataset has no {calendar:?} calendar bounds; window is empty");
    TimeWindow::Empty
}

/// Cap a trailing period count at the number of periods between `min_year` and `now_year`.
pub fn clamp_periods(num_periods: u32, period_type: PeriodType, min_year: i32, now_year: i32) -> u32 {
    let span = u32::try_from(now_year.saturating_sub(min_year)).unwrap_or(0);
    num_periods.min(span.saturating_mul(period_type.per_year()))
}

fn period_start(now: NaiveDateTime, periods: u32, period_type: PeriodType) -> NaiveDateTime {
    let start = match period_type {
        PeriodType::Years => now.checked_sub_months(Months::new(periods.saturating_mul(12))),
        PeriodType::Quarters => now.checked_sub_months(Months::new(periods.saturating_mul(3))),
        PeriodType::Months => now.checked_sub_months(Months::new(periods)),
        PeriodType::Weeks => TimeDelta::try_weeks(i64::from(periods))
            .and_then(|delta| now.checked_sub_signed(delta)),
    };
    start.unwrap_or(NaiveDateTime::MIN)
}

impl TimeWindow {
    pub fn calendar(&self) -> Option<CalendarScheme> {
        match self {
            TimeWindow::Range { calendar, .. }
            | TimeWindow::Years { calendar, .. }
            | TimeWindow::Trailing { calendar, .. } => Some(*calendar),
            TimeWindow::Empty => None,
        }
    }

    pub fn granularity(&self) -> Option<Granularity> {
        match self {
            TimeWindow::Range { granularity, .. } | TimeWindow::Trailing { granularity, .. } => {
                Some(*granularity)
            }
            TimeWindow::Years { .. } => Some(Granularity::Year),
            TimeWindow::Empty => None,
        }
    }

    /// Inclusive span of years the window can touch.
    pub fn year_span(&self) -> Option<RangeInclusive<i32>> {
        match self {
            TimeWindow::Range {
                start_year,
                end_year,
                ..
            } => Some(*start_year..=*end_year),
            TimeWindow::Years {
                start_year,
                last_year,
                ..
            } => Some(*start_year..=*last_year),
            TimeWindow::Trailing { start, end, .. } => Some(start.year()..=end.year()),
            TimeWindow::Empty => None,
        }
    }

    pub fn matches(&self, row: &FactRow) -> bool {
        match *self {
            TimeWindow::Empty => false,
            TimeWindow::Years {
                calendar,
                start_year,
                last_year,
            } => {
                row.calendar_entry_type == Granularity::Year.entry_type(calendar)
                    && row
                        .calendar(calendar)
                        .year
                        .is_some_and(|y| (start_year..=last_year).contains(&y))
            }
            TimeWindow::Trailing {
                calendar,
                granularity,
                start,
                end,
                ..
            } => {
                row.calendar_entry_type == granularity.entry_type(calendar)
                    && (start..=end).contains(&row.date_of_event)
            }
            TimeWindow::Range {
                calendar,
                granularity,
                start_year,
                end_year,
                start_secondary,
                end_secondary,
            } => {
                if row.calendar_entry_type != granularity.entry_type(calendar) {
                    return false;
                }
                let fields = row.calendar(calendar);
                let Some(year) = fields.year else {
                    return false;
                };
                if year < start_year || year > end_year {
                    return false;
                }
                let secondary = fields.secondary(granularity);
                if year == start_year {
                    if let Some(min) = start_secondary {
                        if !secondary.is_some_and(|s| s >= min) {
                            return false;
                        }
                    }
                }
                if year == end_year {
                    if let Some(max) = end_secondary {
                        if !secondary.is_some_and(|s| s < max) {
                            return false;
                        }
                    }
                }
                true
            }
        }
    }

    /// Select the matching rows into a new table.
    ///
    /// [`TimeWindow::Range`] output is ordered by year (start year, interior years ascending,
    /// end year); rows within a year keep their input order. Other windows keep input order.
    pub fn apply(&self, table: &FactTable) -> FactTable {
        let mut rows: Vec<FactRow> = table.iter().filter(|r| self.matches(r)).cloned().collect();
        if let TimeWindow::Range { calendar, .. } = self {
            rows.sort_by_key(|r| r.calendar(*calendar).year);
        }
        log::debug!("time window kept {} of {} rows", rows.len(), table.row_count());
        FactTable::from_rows(rows)
    }
}
