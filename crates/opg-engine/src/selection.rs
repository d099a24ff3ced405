//! Typed user selections.
//!
//! These replace the string-tagged dropdown state of the dashboard: every selection is a closed
//! enum, serializable for IPC adapters, and transient (never stored alongside a dataset).

use crate::hierarchy::HierarchyPath;
use opg_model::{BoundaryConstants, CalendarScheme, Granularity, MeasureType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unit of a trailing ("to current") window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodType {
    Years,
    Quarters,
    Months,
    Weeks,
}

impl PeriodType {
    pub fn granularity(self) -> Granularity {
        match self {
            PeriodType::Years => Granularity::Year,
            PeriodType::Quarters => Granularity::Quarter,
            PeriodType::Months => Granularity::Month,
            PeriodType::Weeks => Granularity::Week,
        }
    }

    /// Periods per calendar year used when clamping a trailing window.
    pub fn per_year(self) -> u32 {
        match self {
            PeriodType::Years => 1,
            PeriodType::Quarters => 4,
            PeriodType::Months => 12,
            PeriodType::Weeks => 53,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimeSelection {
    /// Everything the dataset has, at month grain.
    #[serde(rename_all = "camelCase")]
    AllTime { calendar: CalendarScheme },
    /// The last `num_periods` periods ending now.
    #[serde(rename_all = "camelCase")]
    ToCurrent {
        calendar: CalendarScheme,
        num_periods: u32,
        period_type: PeriodType,
    },
    /// An explicit range. `end_year` and `end_secondary` are exclusive for year grain and the
    /// secondary unit respectively; `None` secondaries leave that boundary year unclipped.
    #[serde(rename_all = "camelCase")]
    SelectRange {
        calendar: CalendarScheme,
        granularity: Granularity,
        start_year: i32,
        end_year: i32,
        start_secondary: Option<u32>,
        end_secondary: Option<u32>,
    },
}

impl TimeSelection {
    pub fn calendar(&self) -> CalendarScheme {
        match self {
            TimeSelection::AllTime { calendar }
            | TimeSelection::ToCurrent { calendar, .. }
            | TimeSelection::SelectRange { calendar, .. } => *calendar,
        }
    }

    /// The date picker's default range for `granularity`, or `None` when the dataset has no
    /// data in `calendar`.
    pub fn default_range(
        bounds: &BoundaryConstants,
        calendar: CalendarScheme,
        granularity: Granularity,
    ) -> Option<Self> {
        let range = bounds.selectable_range(calendar, granularity)?;
        Some(TimeSelection::SelectRange {
            calendar,
            granularity,
            start_year: range.start_year,
            end_year: range.end_year,
            start_secondary: range.start_secondary,
            end_secondary: range.end_secondary,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HierarchySelection {
    /// All roll-up rows at exactly one level. `None` (no level chosen) selects nothing.
    #[serde(rename_all = "camelCase")]
    LevelFilter { level: Option<usize> },
    /// One node, or its direct children.
    #[serde(rename_all = "camelCase")]
    SpecificItem {
        path: HierarchyPath,
        include_children: bool,
    },
}

impl HierarchySelection {
    pub fn level(level: usize) -> Self {
        HierarchySelection::LevelFilter { level: Some(level) }
    }

    pub fn item(path: HierarchyPath) -> Self {
        HierarchySelection::SpecificItem {
            path,
            include_children: false,
        }
    }

    pub fn children_of(path: HierarchyPath) -> Self {
        HierarchySelection::SpecificItem {
            path,
            include_children: true,
        }
    }

    pub fn path(&self) -> Option<&HierarchyPath> {
        match self {
            HierarchySelection::SpecificItem { path, .. } => Some(path),
            HierarchySelection::LevelFilter { .. } => None,
        }
    }
}

/// Measure type plus the variable names to keep.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSelection {
    pub measure_type: MeasureType,
    pub variables: BTreeSet<String>,
}

impl VariableSelection {
    pub fn new<I, S>(measure_type: MeasureType, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            measure_type,
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// A selection of one variable, as sent by single-select widgets.
    pub fn single(measure_type: MeasureType, variable: impl Into<String>) -> Self {
        Self::new(measure_type, [variable.into()])
    }
}
