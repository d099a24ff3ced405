use crate::calendar::{CalendarEntryType, CalendarFields, CalendarScheme};
use crate::error::{ModelError, ModelResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of hierarchy columns (`H0`..`H5`).
pub const MAX_DEPTH: usize = 6;

/// The `H0`..`H5` columns of a row.
///
/// Levels are populated contiguously from `H0`; once a level is empty every deeper level is
/// empty too. Constructors reject rows that violate this, so `depth()` is simply the number
/// of populated levels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<String>>", into = "Vec<Option<String>>")]
pub struct HierarchyLevels([Option<String>; MAX_DEPTH]);

impl HierarchyLevels {
    /// The root (no level populated).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_path<I, S>(segments: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut levels: [Option<String>; MAX_DEPTH] = Default::default();
        let mut depth = 0;
        for segment in segments {
            if depth == MAX_DEPTH {
                return Err(ModelError::HierarchyTooDeep { depth: depth + 1 });
            }
            levels[depth] = Some(segment.into());
            depth += 1;
        }
        Ok(Self(levels))
    }

    /// Build from raw column values, validating that the populated levels form a prefix.
    pub fn from_columns(columns: [Option<String>; MAX_DEPTH]) -> ModelResult<Self> {
        let depth = columns.iter().take_while(|c| c.is_some()).count();
        if let Some(level) = columns[depth..].iter().position(Option::is_some) {
            return Err(ModelError::HierarchyGap {
                level: depth + level,
            });
        }
        Ok(Self(columns))
    }

    pub fn get(&self, level: usize) -> Option<&str> {
        self.0.get(level)?.as_deref()
    }

    pub fn depth(&self) -> usize {
        self.0.iter().take_while(|c| c.is_some()).count()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map_while(|c| c.as_deref())
    }

    /// `H0..H{k-1}` equal `prefix`, where `k = prefix.len()`.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        if prefix.len() > MAX_DEPTH {
            return false;
        }
        prefix
            .iter()
            .zip(self.0.iter())
            .all(|(want, have)| have.as_deref() == Some(want.as_ref()))
    }

    /// The row is the materialized roll-up at exactly `level`: `H{level}` populated and every
    /// deeper level empty.
    pub fn is_rollup_at(&self, level: usize) -> bool {
        self.get(level).is_some() && self.get(level + 1).is_none()
    }

    /// Keep `H0..H{depth-1}` and clear every deeper level.
    pub fn truncated(&self, depth: usize) -> Self {
        let mut levels = self.0.clone();
        for slot in levels.iter_mut().skip(depth) {
            *slot = None;
        }
        Self(levels)
    }

    pub fn as_columns(&self) -> &[Option<String>; MAX_DEPTH] {
        &self.0
    }
}

impl TryFrom<Vec<Option<String>>> for HierarchyLevels {
    type Error = ModelError;

    fn try_from(value: Vec<Option<String>>) -> Result<Self, Self::Error> {
        if value.len() > MAX_DEPTH {
            return Err(ModelError::HierarchyTooDeep { depth: value.len() });
        }
        let mut columns: [Option<String>; MAX_DEPTH] = Default::default();
        for (slot, v) in columns.iter_mut().zip(value) {
            *slot = v;
        }
        Self::from_columns(columns)
    }
}

impl From<HierarchyLevels> for Vec<Option<String>> {
    fn from(value: HierarchyLevels) -> Self {
        value.0.into_iter().collect()
    }
}

/// Dataset-defined measure kind (e.g. `Count`, `Dollar`, `Duration`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasureType(String);

impl MeasureType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MeasureType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Whether a row came from the source dataset or was produced by the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowOrigin {
    #[default]
    Native,
    /// Summed from native rows. Descriptive columns that cannot be recomputed for a bucket
    /// (julian day, activity id, fiscal fields, week) are `None`; the remaining descriptive
    /// columns are copied from the first contributing row.
    Synthesized,
}

/// One dated, measured event (or pre-aggregated roll-up) of the fact table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRow {
    pub dataset: String,
    pub hierarchy_one_name: Option<String>,
    pub hierarchy: HierarchyLevels,
    pub variable_name: String,
    pub variable_qualifier: Option<String>,
    pub variable_sub_qualifier: Option<String>,
    pub date_of_event: NaiveDate,
    pub calendar_entry_type: CalendarEntryType,
    pub gregorian: CalendarFields,
    pub fiscal: CalendarFields,
    pub julian_day: Option<i64>,
    pub activity_event_id: Option<String>,
    pub measure_value: f64,
    pub measure_type: MeasureType,
    pub partial_period: Option<bool>,
    #[serde(default)]
    pub origin: RowOrigin,
}

impl FactRow {
    /// A native row with the mandatory columns set; every optional column starts empty.
    pub fn new(
        dataset: impl Into<String>,
        hierarchy: HierarchyLevels,
        variable_name: impl Into<String>,
        date_of_event: NaiveDate,
        calendar_entry_type: CalendarEntryType,
        measure_type: MeasureType,
        measure_value: f64,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            hierarchy_one_name: None,
            hierarchy,
            variable_name: variable_name.into(),
            variable_qualifier: None,
            variable_sub_qualifier: None,
            date_of_event,
            calendar_entry_type,
            gregorian: CalendarFields::default(),
            fiscal: CalendarFields::default(),
            julian_day: None,
            activity_event_id: None,
            measure_value,
            measure_type,
            partial_period: None,
            origin: RowOrigin::Native,
        }
    }

    pub fn with_gregorian(mut self, fields: CalendarFields) -> Self {
        self.gregorian = fields;
        self
    }

    pub fn with_fiscal(mut self, fields: CalendarFields) -> Self {
        self.fiscal = fields;
        self
    }

    pub fn with_qualifiers(
        mut self,
        qualifier: Option<String>,
        sub_qualifier: Option<String>,
    ) -> Self {
        self.variable_qualifier = qualifier;
        self.variable_sub_qualifier = sub_qualifier;
        self
    }

    pub fn with_partial_period(mut self, partial: bool) -> Self {
        self.partial_period = Some(partial);
        self
    }

    pub fn calendar(&self, scheme: CalendarScheme) -> &CalendarFields {
        match scheme {
            CalendarScheme::Gregorian => &self.gregorian,
            CalendarScheme::Fiscal => &self.fiscal,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.origin == RowOrigin::Synthesized
    }

    /// Project one column of the fixed schema.
    pub fn cell(&self, column: Column) -> Cell<'_> {
        fn text(v: &Option<String>) -> Cell<'_> {
            v.as_deref().map_or(Cell::Null, Cell::Text)
        }
        fn int<T: Into<i64> + Copy>(v: Option<T>) -> Cell<'static> {
            v.map_or(Cell::Null, |v| Cell::Integer(v.into()))
        }

        match column {
            Column::Dataset => Cell::Text(&self.dataset),
            Column::HierarchyOneName => text(&self.hierarchy_one_name),
            Column::Level(level) => self.hierarchy.get(level).map_or(Cell::Null, Cell::Text),
            Column::VariableName => Cell::Text(&self.variable_name),
            Column::VariableQualifier => text(&self.variable_qualifier),
            Column::VariableSubQualifier => text(&self.variable_sub_qualifier),
            Column::DateOfEvent => Cell::Date(self.date_of_event),
            Column::CalendarEntryType => Cell::Text(self.calendar_entry_type.as_str()),
            Column::Year(scheme) => int(self.calendar(scheme).year),
            Column::Quarter(scheme) => int(self.calendar(scheme).quarter),
            Column::Month(scheme) => int(self.calendar(scheme).month),
            Column::Week(scheme) => int(self.calendar(scheme).week),
            Column::JulianDay => int(self.julian_day),
            Column::ActivityEventId => text(&self.activity_event_id),
            Column::MeasureValue => Cell::Number(self.measure_value),
            Column::MeasureType => Cell::Text(self.measure_type.as_str()),
            Column::PartialPeriod => self.partial_period.map_or(Cell::Null, Cell::Bool),
        }
    }
}

/// Borrowed scalar for a single cell of a [`FactRow`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell<'a> {
    Null,
    Text(&'a str),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl Cell<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// The fixed column set shared by native and synthesized rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Dataset,
    HierarchyOneName,
    /// `H0`..`H5`.
    Level(usize),
    VariableName,
    VariableQualifier,
    VariableSubQualifier,
    DateOfEvent,
    CalendarEntryType,
    Year(CalendarScheme),
    Quarter(CalendarScheme),
    Month(CalendarScheme),
    Week(CalendarScheme),
    JulianDay,
    ActivityEventId,
    MeasureValue,
    MeasureType,
    PartialPeriod,
}

impl Column {
    pub const ALL: [Column; 26] = [
        Column::Dataset,
        Column::HierarchyOneName,
        Column::Level(0),
        Column::Level(1),
        Column::Level(2),
        Column::Level(3),
        Column::Level(4),
        Column::Level(5),
        Column::VariableName,
        Column::VariableQualifier,
        Column::VariableSubQualifier,
        Column::DateOfEvent,
        Column::CalendarEntryType,
        Column::Year(CalendarScheme::Gregorian),
        Column::Quarter(CalendarScheme::Gregorian),
        Column::Month(CalendarScheme::Gregorian),
        Column::Week(CalendarScheme::Gregorian),
        Column::Year(CalendarScheme::Fiscal),
        Column::Quarter(CalendarScheme::Fiscal),
        Column::Month(CalendarScheme::Fiscal),
        Column::Week(CalendarScheme::Fiscal),
        Column::JulianDay,
        Column::ActivityEventId,
        Column::MeasureValue,
        Column::MeasureType,
        Column::PartialPeriod,
    ];

    pub fn name(self) -> &'static str {
        use CalendarScheme::{Fiscal, Gregorian};
        const LEVELS: [&str; MAX_DEPTH] = ["H0", "H1", "H2", "H3", "H4", "H5"];
        match self {
            Column::Dataset => "OPG Data Set",
            Column::HierarchyOneName => "Hierarchy One Name",
            Column::Level(level) => LEVELS.get(level).copied().unwrap_or("H?"),
            Column::VariableName => "Variable Name",
            Column::VariableQualifier => "Variable Name Qualifier",
            Column::VariableSubQualifier => "Variable Name Sub Qualifier",
            Column::DateOfEvent => "Date of Event",
            Column::CalendarEntryType => "Calendar Entry Type",
            Column::Year(Gregorian) => "Year of Event",
            Column::Quarter(Gregorian) => "Quarter",
            Column::Month(Gregorian) => "Month of Event",
            Column::Week(Gregorian) => "Week of Event",
            Column::Year(Fiscal) => "Fiscal Year of Event",
            Column::Quarter(Fiscal) => "Fiscal Quarter",
            Column::Month(Fiscal) => "Fiscal Month of Event",
            Column::Week(Fiscal) => "Fiscal Week of Event",
            Column::JulianDay => "Julian Day",
            Column::ActivityEventId => "Activity Event Id",
            Column::MeasureValue => "Measure Value",
            Column::MeasureType => "Measure Type",
            Column::PartialPeriod => "Partial Period",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ModelError::UnknownColumn(s.to_string()))
    }
}
