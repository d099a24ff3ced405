use chrono::NaiveDate;
use opg_model::{
    BoundaryConstants, CalendarEntryType, CalendarFields, CalendarScheme, FactRow, FactTable,
    GrainBounds, Granularity, HierarchyLevels, MeasureType, SelectableRange,
};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month_row(year: i32, month: u32) -> FactRow {
    FactRow::new(
        "OPG001",
        HierarchyLevels::from_path(["Total"]).unwrap(),
        "Complaints",
        date(year, month, 1),
        CalendarEntryType::Month,
        MeasureType::new("Count"),
        1.0,
    )
    .with_gregorian(CalendarFields::month(year, month))
}

/// Months 1-12 of 2016 and 1-10 of 2017, plus quarter and year roll-ups.
fn fixture_2016_2017() -> FactTable {
    let mut table = FactTable::new();
    for m in 1..=12 {
        table.push_row(month_row(2016, m));
    }
    for m in 1..=10 {
        table.push_row(month_row(2017, m));
    }
    for (y, q) in [(2016, 1), (2016, 2), (2016, 3), (2016, 4), (2017, 1), (2017, 2), (2017, 3)] {
        let mut row = month_row(y, q * 3);
        row.calendar_entry_type = CalendarEntryType::Quarter;
        row.gregorian = CalendarFields::quarter(y, q);
        table.push_row(row);
    }
    let mut year = month_row(2016, 12);
    year.calendar_entry_type = CalendarEntryType::Year;
    year.gregorian = CalendarFields::year(2016);
    table.push_row(year);
    table
}

#[test]
fn gregorian_bounds_from_fixture() {
    let bounds = BoundaryConstants::from_table(&fixture_2016_2017());
    let greg = bounds.calendar(CalendarScheme::Gregorian).unwrap();

    assert_eq!(greg.min_year, 2016);
    assert_eq!(greg.year_max, 2016);
    assert_eq!(
        greg.month,
        GrainBounds {
            max_year: 2017,
            fringe_min: 1,
            fringe_max: 10,
        }
    );
    assert_eq!(
        greg.quarter,
        GrainBounds {
            max_year: 2017,
            fringe_min: 1,
            fringe_max: 4,
        }
    );
    assert!(!greg.week_available);
    assert!(!bounds.fiscal_available());
    assert!(bounds.calendar(CalendarScheme::Fiscal).is_none());
}

#[test]
fn selectable_range_rolls_over_at_natural_maximum() {
    let mut table = FactTable::new();
    for m in 3..=12 {
        table.push_row(month_row(2016, m));
    }
    let bounds = BoundaryConstants::from_table(&table);

    assert_eq!(
        bounds.selectable_range(CalendarScheme::Gregorian, Granularity::Month),
        Some(SelectableRange {
            start_year: 2016,
            end_year: 2017,
            start_secondary: Some(3),
            end_secondary: Some(1),
        })
    );
}

#[test]
fn selectable_range_stays_in_last_year_below_natural_maximum() {
    let bounds = BoundaryConstants::from_table(&fixture_2016_2017());

    assert_eq!(
        bounds.selectable_range(CalendarScheme::Gregorian, Granularity::Month),
        Some(SelectableRange {
            start_year: 2016,
            end_year: 2017,
            start_secondary: Some(1),
            end_secondary: Some(11),
        })
    );
    assert_eq!(
        bounds.selectable_range(CalendarScheme::Gregorian, Granularity::Year),
        Some(SelectableRange {
            start_year: 2016,
            end_year: 2017,
            start_secondary: None,
            end_secondary: None,
        })
    );
    assert_eq!(
        bounds.selectable_range(CalendarScheme::Fiscal, Granularity::Month),
        None
    );
}

#[test]
fn fiscal_bounds_use_fiscal_year_tag() {
    let mut table = fixture_2016_2017();
    let mut fy = month_row(2017, 6);
    fy.calendar_entry_type = CalendarEntryType::FiscalYear;
    fy.gregorian = CalendarFields::default();
    fy.fiscal = CalendarFields::year(2017);
    table.push_row(fy);
    let mut fm = month_row(2016, 7);
    fm.gregorian = CalendarFields::default();
    fm.fiscal = CalendarFields::month(2016, 1);
    table.push_row(fm);

    let bounds = BoundaryConstants::from_table(&table);
    let fiscal = bounds.calendar(CalendarScheme::Fiscal).unwrap();
    assert_eq!(fiscal.min_year, 2016);
    assert_eq!(fiscal.year_max, 2017);
    assert_eq!(fiscal.month.max_year, 2016);
    assert_eq!(fiscal.month.fringe_min, 1);
}

#[test]
fn date_span_bounds_cover_event_dates() {
    let mut table = FactTable::new();
    for (y, m, d) in [(2015, 2, 14), (2018, 11, 30), (2016, 6, 1)] {
        let row = FactRow::new(
            "OPG011",
            HierarchyLevels::from_path(["Region", "North"]).unwrap(),
            "Cases",
            date(y, m, d),
            CalendarEntryType::Unknown("Event".into()),
            MeasureType::new("Count"),
            1.0,
        );
        table.push_row(row);
    }

    let bounds = BoundaryConstants::from_date_span(&table);
    let greg = bounds.gregorian.unwrap();
    assert_eq!(greg.min_year, 2015);
    assert_eq!(greg.year_max, 2018);
    assert_eq!(greg.month.fringe_min, 2);
    assert_eq!(greg.month.fringe_max, 11);
    assert_eq!(greg.quarter.fringe_min, 1);
    assert_eq!(greg.quarter.fringe_max, 4);
    assert_eq!(greg.week.max_year, 2018);
    assert!(bounds.fiscal.is_none());

    assert_eq!(BoundaryConstants::from_date_span(&FactTable::new()), BoundaryConstants::default());
}
