#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use opg_engine::{DatasetVariant, HierarchyPath, InMemorySource, LoadedDataset};
use opg_model::{
    CalendarEntryType, CalendarFields, FactRow, FactTable, HierarchyLevels, MeasureType,
};

pub const PRE_AGGREGATED: &str = "OPG001";
pub const HIERARCHICAL: &str = "OPG011";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

pub fn path(segments: &[&str]) -> HierarchyPath {
    HierarchyPath::new(segments.iter().copied()).unwrap()
}

pub fn levels(segments: &[&str]) -> HierarchyLevels {
    HierarchyLevels::from_path(segments.iter().copied()).unwrap()
}

fn base_row(
    segments: &[&str],
    variable: &str,
    measure: &str,
    date_of_event: NaiveDate,
    entry: CalendarEntryType,
    value: f64,
) -> FactRow {
    FactRow::new(
        PRE_AGGREGATED,
        levels(segments),
        variable,
        date_of_event,
        entry,
        MeasureType::new(measure),
        value,
    )
}

pub fn month_row(segments: &[&str], variable: &str, year: i32, month: u32, value: f64) -> FactRow {
    base_row(
        segments,
        variable,
        "Count",
        date(year, month, 1),
        CalendarEntryType::Month,
        value,
    )
    .with_gregorian(CalendarFields::month(year, month))
}

pub fn quarter_row(segments: &[&str], variable: &str, year: i32, quarter: u32, value: f64) -> FactRow {
    base_row(
        segments,
        variable,
        "Count",
        date(year, quarter * 3, 1),
        CalendarEntryType::Quarter,
        value,
    )
    .with_gregorian(CalendarFields::quarter(year, quarter))
}

pub fn year_row(segments: &[&str], variable: &str, year: i32, value: f64) -> FactRow {
    base_row(
        segments,
        variable,
        "Count",
        date(year, 12, 31),
        CalendarEntryType::Year,
        value,
    )
    .with_gregorian(CalendarFields::year(year))
}

pub fn week_row(
    segments: &[&str],
    variable: &str,
    year: i32,
    month: u32,
    week: u32,
    day: u32,
    value: f64,
) -> FactRow {
    base_row(
        segments,
        variable,
        "Count",
        date(year, month, day),
        CalendarEntryType::Week,
        value,
    )
    .with_gregorian(CalendarFields::week(year, month, week))
}

pub const PATHS: [&[&str]; 4] = [
    &["Total"],
    &["Total", "North"],
    &["Total", "South"],
    &["Total", "North", "Leeds"],
];

/// Roll-ups for four nodes: months 1-12 of 2016 and 1-10 of 2017, quarters, the 2016 year,
/// a handful of weeks, a `Dollar` measure for 2017 and one fiscal-year row.
pub fn pre_aggregated_table() -> FactTable {
    let mut table = FactTable::new();
    for segments in PATHS {
        for m in 1..=12 {
            table.push_row(month_row(segments, "Complaints", 2016, m, 1.0));
        }
        for m in 1..=10 {
            table.push_row(month_row(segments, "Complaints", 2017, m, 1.0));
        }
        for q in 1..=4 {
            table.push_row(quarter_row(segments, "Complaints", 2016, q, 3.0));
        }
        for q in 1..=3 {
            table.push_row(quarter_row(segments, "Complaints", 2017, q, 3.0));
        }
        table.push_row(year_row(segments, "Complaints", 2016, 12.0));
        for (w, d) in [(1, 1), (2, 4), (3, 11)] {
            table.push_row(week_row(segments, "Complaints", 2016, 1, w, d, 0.5));
        }
        for (w, d) in [(38, 18), (39, 25)] {
            table.push_row(week_row(segments, "Complaints", 2017, 9, w, d, 0.5));
        }
        for m in 1..=10 {
            let mut row = month_row(segments, "Refunds", 2017, m, 10.0);
            row.measure_type = MeasureType::new("Dollar");
            table.push_row(row);
        }
    }

    let mut fiscal = base_row(
        &["Total"],
        "Complaints",
        "Count",
        date(2017, 3, 31),
        CalendarEntryType::FiscalYear,
        12.0,
    );
    fiscal.fiscal = CalendarFields::year(2017);
    table.push_row(fiscal);
    table
}

pub fn event_row(segments: &[&str], variable: &str, on: NaiveDate, value: f64) -> FactRow {
    let mut row = FactRow::new(
        HIERARCHICAL,
        levels(segments),
        variable,
        on,
        CalendarEntryType::Unknown("Event".to_string()),
        MeasureType::new("Count"),
        value,
    );
    row.hierarchy_one_name = Some("Region".to_string());
    row.julian_day = Some(i64::from(on.ordinal()));
    row.activity_event_id = Some(format!("{segments:?}@{on}"));
    row
}

/// Individual events under `Region`, spanning 2016-01-15 to 2017-11-30, plus native weekly
/// `Visits` rows.
pub fn hierarchical_table() -> FactTable {
    let mut table = FactTable::new();
    let events: [(&[&str], NaiveDate, f64); 6] = [
        (&["Region", "North", "Leeds"], date(2016, 1, 15), 1.0),
        (&["Region", "North", "Leeds"], date(2016, 1, 20), 2.0),
        (&["Region", "North", "York"], date(2016, 2, 3), 4.0),
        (&["Region", "South", "Bath"], date(2016, 1, 31), 8.0),
        (&["Region", "South", "Bath"], date(2017, 3, 10), 16.0),
        (&["Region", "North", "Leeds"], date(2017, 11, 30), 32.0),
    ];
    for (segments, on, value) in events {
        table.push_row(event_row(segments, "Complaints", on, value));
    }

    let mut visit = event_row(&["Region", "North", "Leeds"], "Visits", date(2017, 1, 2), 5.0);
    visit.calendar_entry_type = CalendarEntryType::Week;
    visit.gregorian = CalendarFields::week(2017, 1, 2);
    table.push_row(visit);
    table
}

pub fn source() -> InMemorySource {
    InMemorySource::new()
        .with_dataset(
            PRE_AGGREGATED,
            LoadedDataset::new(pre_aggregated_table(), DatasetVariant::PreAggregated),
        )
        .with_dataset(
            HIERARCHICAL,
            LoadedDataset::new(hierarchical_table(), DatasetVariant::Hierarchical),
        )
}
