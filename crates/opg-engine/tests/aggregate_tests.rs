use opg_engine::{candidate_rows, Aggregator, BucketKey, HierarchySelection};
use opg_model::{
    CalendarEntryType, CalendarFields, FactTable, Granularity, RowOrigin,
};
use pretty_assertions::assert_eq;

mod common;

use common::{date, event_row, hierarchical_table, path};

fn aggregate(table: &FactTable, selection: &HierarchySelection, granularity: Granularity) -> FactTable {
    let candidates = candidate_rows(table, selection);
    Aggregator::new(granularity).aggregate(&candidates, None)
}

fn summary(table: &FactTable) -> Vec<(String, String, f64)> {
    table
        .iter()
        .map(|r| {
            (
                r.hierarchy.segments().collect::<Vec<_>>().join("/"),
                r.date_of_event.to_string(),
                r.measure_value,
            )
        })
        .collect()
}

#[test]
fn bucket_keys_and_end_dates() {
    let d = date(2016, 2, 3);
    assert_eq!(BucketKey::for_date(d, Granularity::Year), Some(BucketKey::Year(2016)));
    assert_eq!(
        BucketKey::for_date(d, Granularity::Quarter),
        Some(BucketKey::Quarter(2016, 1))
    );
    assert_eq!(BucketKey::for_date(d, Granularity::Week), None);
    assert_eq!(BucketKey::Month(2016, 2).end_date(), Some(date(2016, 2, 29)));
    assert_eq!(BucketKey::Quarter(2016, 4).end_date(), Some(date(2016, 12, 31)));
    assert_eq!(
        BucketKey::Month(2016, 2).calendar_fields(),
        CalendarFields::month(2016, 2)
    );
}

#[test]
fn month_rollup_at_level_one() {
    let out = aggregate(
        &hierarchical_table(),
        &HierarchySelection::level(1),
        Granularity::Month,
    );

    assert_eq!(
        summary(&out),
        vec![
            ("Region/North".to_string(), "2016-01-31".to_string(), 3.0),
            ("Region/North".to_string(), "2016-02-29".to_string(), 4.0),
            ("Region/South".to_string(), "2016-01-31".to_string(), 8.0),
            ("Region/South".to_string(), "2017-03-31".to_string(), 16.0),
            ("Region/North".to_string(), "2017-11-30".to_string(), 32.0),
            ("Region/North".to_string(), "2017-01-31".to_string(), 5.0),
        ]
    );
    assert!(out.iter().all(|r| r.origin == RowOrigin::Synthesized
        && r.calendar_entry_type == CalendarEntryType::Month));
}

#[test]
fn synthesized_rows_describe_their_bucket() {
    let out = aggregate(
        &hierarchical_table(),
        &HierarchySelection::item(path(&["Region", "North"])),
        Granularity::Quarter,
    );
    let first = &out.rows()[0];

    assert_eq!(first.gregorian, CalendarFields::quarter(2016, 1));
    assert_eq!(first.date_of_event, date(2016, 3, 31));
    assert_eq!(first.measure_value, 1.0 + 2.0 + 4.0);
    assert_eq!(first.julian_day, None);
    assert_eq!(first.activity_event_id, None);
    assert_eq!(first.fiscal, CalendarFields::default());
    assert_eq!(first.gregorian.week, None);
    assert_eq!(first.hierarchy.depth(), 2);
}

#[test]
fn descriptive_fields_come_from_first_group_member() {
    let mut table = FactTable::new();
    let mut a = event_row(&["Region", "North", "Leeds"], "Complaints", date(2016, 5, 1), 1.0);
    a.hierarchy_one_name = Some("first".to_string());
    a.partial_period = Some(true);
    let mut b = event_row(&["Region", "North", "York"], "Complaints", date(2016, 5, 9), 2.0);
    b.hierarchy_one_name = Some("second".to_string());
    b.partial_period = Some(false);
    table.push_row(a);
    table.push_row(b.clone());

    let out = aggregate(&table, &HierarchySelection::level(0), Granularity::Year);
    assert_eq!(out.row_count(), 1);
    assert_eq!(out.rows()[0].hierarchy_one_name.as_deref(), Some("first"));
    assert_eq!(out.rows()[0].partial_period, Some(true));
    assert_eq!(out.rows()[0].measure_value, 3.0);

    // Swapping input order swaps the representative.
    let mut swapped = FactTable::new();
    swapped.push_row(b);
    swapped.push_row(table.rows()[0].clone());
    let out = aggregate(&swapped, &HierarchySelection::level(0), Granularity::Year);
    assert_eq!(out.rows()[0].hierarchy_one_name.as_deref(), Some("second"));
}

#[test]
fn groups_split_on_variable_and_qualifiers() {
    let mut table = FactTable::new();
    let base = event_row(&["Region", "North"], "Complaints", date(2016, 5, 1), 1.0);
    table.push_row(base.clone());
    table.push_row(base.clone().with_qualifiers(Some("Phone".to_string()), None));
    table.push_row(
        base.clone()
            .with_qualifiers(Some("Phone".to_string()), Some("Mobile".to_string())),
    );
    let mut other = base.clone();
    other.variable_name = "Refunds".to_string();
    table.push_row(other);
    table.push_row(base);

    let out = aggregate(&table, &HierarchySelection::level(0), Granularity::Month);
    let values: Vec<f64> = out.iter().map(|r| r.measure_value).collect();
    assert_eq!(values, vec![2.0, 1.0, 1.0, 1.0]);
}

#[test]
fn week_returns_native_weekly_rows() {
    let table = hierarchical_table();
    let out = aggregate(&table, &HierarchySelection::level(0), Granularity::Week);

    assert_eq!(out.row_count(), 1);
    assert_eq!(out.rows()[0], table.rows()[6]);
    assert_eq!(out.rows()[0].origin, RowOrigin::Native);
}

#[test]
fn year_span_restricts_source_rows() {
    let table = hierarchical_table();
    let candidates = candidate_rows(&table, &HierarchySelection::level(0));
    let out = Aggregator::new(Granularity::Year).aggregate(&candidates, Some(2017..=2017));

    let years: Vec<Option<i32>> = out.iter().map(|r| r.gregorian.year).collect();
    assert_eq!(years, vec![Some(2017), Some(2017)]);
    assert_eq!(out.rows()[0].measure_value, 16.0 + 32.0);
    assert_eq!(out.rows()[1].variable_name, "Visits");
}

#[test]
fn aggregation_is_idempotent_and_sparse() {
    let table = hierarchical_table();
    let selection = HierarchySelection::children_of(path(&["Region"]));
    let first = aggregate(&table, &selection, Granularity::Month);
    let second = aggregate(&table, &selection, Granularity::Month);
    assert_eq!(first, second);

    // No bucket without contributing rows (e.g. 2016-03 .. 2016-12) is emitted.
    assert!(first.iter().all(|r| r.measure_value > 0.0));
    assert!(aggregate(&FactTable::new(), &selection, Granularity::Month).is_empty());
}
