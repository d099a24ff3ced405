use crate::fact::{Column, FactRow, MeasureType};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// In-memory fact table.
///
/// The column set is fixed (see [`Column::ALL`]), so an empty table is already a
/// schema-complete result. Filtering never mutates `self`; every derived table owns its rows
/// and can be transformed further without touching the store it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FactTable {
    rows: Vec<FactRow>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<FactRow>) -> Self {
        Self { rows }
    }

    pub fn columns() -> impl Iterator<Item = &'static str> {
        Column::ALL.into_iter().map(Column::name)
    }

    pub fn push_row(&mut self, row: FactRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[FactRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FactRow> {
        self.rows.iter()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<FactRow> {
        self.rows
    }

    /// Copy out the rows matching `predicate`, preserving input order.
    pub fn filter<P>(&self, mut predicate: P) -> FactTable
    where
        P: FnMut(&FactRow) -> bool,
    {
        FactTable {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Distinct measure types present in the table, sorted.
    pub fn measure_types(&self) -> Vec<MeasureType> {
        let set: BTreeSet<&MeasureType> = self.rows.iter().map(|r| &r.measure_type).collect();
        set.into_iter().cloned().collect()
    }

    /// Distinct variable names present in the table, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().map(|r| r.variable_name.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Earliest and latest `Date of Event`.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.date_of_event).min()?;
        let max = self.rows.iter().map(|r| r.date_of_event).max()?;
        Some((min, max))
    }
}

impl Extend<FactRow> for FactTable {
    fn extend<T: IntoIterator<Item = FactRow>>(&mut self, iter: T) {
        self.rows.extend(iter);
    }
}

impl FromIterator<FactRow> for FactTable {
    fn from_iter<T: IntoIterator<Item = FactRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FactTable {
    type Item = &'a FactRow;
    type IntoIter = std::slice::Iter<'a, FactRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for FactTable {
    type Item = FactRow;
    type IntoIter = std::vec::IntoIter<FactRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
