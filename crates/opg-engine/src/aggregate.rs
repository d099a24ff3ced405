//! On-the-fly roll-ups for datasets that store events instead of pre-aggregated rows.

use crate::hierarchy::HierarchyPath;
use chrono::{Datelike, NaiveDate};
use opg_model::{
    last_day_of_month, last_day_of_quarter, last_day_of_year, quarter_of_month,
    CalendarEntryType, CalendarFields, CalendarScheme, FactRow, FactTable, Granularity,
    MeasureType, RowOrigin,
};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// The period a synthesized row covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Year(i32),
    Quarter(i32, u32),
    Month(i32, u32),
}

impl BucketKey {
    /// Bucket containing `date`. Week is never bucketed.
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Option<Self> {
        match granularity {
            Granularity::Year => Some(BucketKey::Year(date.year())),
            Granularity::Quarter => Some(BucketKey::Quarter(
                date.year(),
                quarter_of_month(date.month()),
            )),
            Granularity::Month => Some(BucketKey::Month(date.year(), date.month())),
            Granularity::Week => None,
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            BucketKey::Year(_) => Granularity::Year,
            BucketKey::Quarter(..) => Granularity::Quarter,
            BucketKey::Month(..) => Granularity::Month,
        }
    }

    /// Last calendar day of the bucket.
    pub fn end_date(self) -> Option<NaiveDate> {
        match self {
            BucketKey::Year(y) => last_day_of_year(y),
            BucketKey::Quarter(y, q) => last_day_of_quarter(y, q),
            BucketKey::Month(y, m) => last_day_of_month(y, m),
        }
    }

    /// Gregorian year/quarter/month columns describing the bucket.
    pub fn calendar_fields(self) -> CalendarFields {
        match self {
            BucketKey::Year(y) => CalendarFields::year(y),
            BucketKey::Quarter(y, q) => CalendarFields::quarter(y, q),
            BucketKey::Month(y, m) => CalendarFields::month(y, m),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GroupKey<'a> {
    measure_type: &'a MeasureType,
    variable: &'a str,
    qualifier: Option<&'a str>,
    sub_qualifier: Option<&'a str>,
    path: HierarchyPath,
    bucket: BucketKey,
}

struct Group<'a> {
    first: &'a FactRow,
    target_depth: usize,
    bucket: BucketKey,
    sum: f64,
}

/// Sums candidate rows into one row per (measure, variable, qualifiers, target node, bucket).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aggregator {
    granularity: Granularity,
}

impl Aggregator {
    pub fn new(granularity: Granularity) -> Self {
        Self { granularity }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Roll `candidates` (rows paired with their target node, see
    /// [`crate::candidate_rows`]) up to this aggregator's grain.
    ///
    /// Groups are emitted in order of first appearance. Descriptive columns come from the first
    /// row of each group; columns that cannot describe a whole bucket are cleared. Rows whose
    /// event year falls outside `years` are ignored. Buckets with no contributing rows are not
    /// emitted.
    ///
    /// Week grain is never synthesized: the native `Week` rows among the candidates are
    /// returned as-is.
    pub fn aggregate(
        &self,
        candidates: &[(HierarchyPath, &FactRow)],
        years: Option<RangeInclusive<i32>>,
    ) -> FactTable {
        let in_span = |row: &FactRow| {
            years
                .as_ref()
                .map_or(true, |span| span.contains(&row.date_of_event.year()))
        };

        if self.granularity == Granularity::Week {
            return candidates
                .iter()
                .map(|(_, row)| *row)
                .filter(|row| row.calendar_entry_type == CalendarEntryType::Week && in_span(*row))
                .cloned()
                .collect();
        }

        let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
        let mut groups: Vec<Group<'_>> = Vec::new();
        for (path, row) in candidates.iter().map(|(path, row)| (path, *row)) {
            if !in_span(row) {
                continue;
            }
            let Some(bucket) = BucketKey::for_date(row.date_of_event, self.granularity) else {
                continue;
            };
            let key = GroupKey {
                measure_type: &row.measure_type,
                variable: &row.variable_name,
                qualifier: row.variable_qualifier.as_deref(),
                sub_qualifier: row.variable_sub_qualifier.as_deref(),
                path: path.clone(),
                bucket,
            };
            match index.get(&key) {
                Some(&i) => groups[i].sum += row.measure_value,
                None => {
                    index.insert(key, groups.len());
                    groups.push(Group {
                        first: row,
                        target_depth: path.depth(),
                        bucket,
                        sum: row.measure_value,
                    });
                }
            }
        }

        let out: FactTable = groups.into_iter().filter_map(synthesize).collect();
        log::debug!(
            "aggregated {} candidate rows into {} {} rows",
            candidates.len(),
            out.row_count(),
            self.granularity
        );
        out
    }
}

fn synthesize(group: Group<'_>) -> Option<FactRow> {
    let first = group.first;
    Some(FactRow {
        dataset: first.dataset.clone(),
        hierarchy_one_name: first.hierarchy_one_name.clone(),
        hierarchy: first.hierarchy.truncated(group.target_depth),
        variable_name: first.variable_name.clone(),
        variable_qualifier: first.variable_qualifier.clone(),
        variable_sub_qualifier: first.variable_sub_qualifier.clone(),
        date_of_event: group.bucket.end_date()?,
        calendar_entry_type: group
            .bucket
            .granularity()
            .entry_type(CalendarScheme::Gregorian),
        gregorian: group.bucket.calendar_fields(),
        fiscal: CalendarFields::default(),
        julian_day: None,
        activity_event_id: None,
        measure_value: group.sum,
        measure_type: first.measure_type.clone(),
        partial_period: first.partial_period,
        origin: RowOrigin::Synthesized,
    })
}
