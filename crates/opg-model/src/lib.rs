//! `opg-model` defines the in-memory fact table consumed by the OPG filter engine.
//!
//! The crate is intentionally small and dependency-light so it can be shared by:
//! - the query engine (`opg-engine`: hierarchy, time and aggregation passes)
//! - upstream loaders that materialize a dataset into a [`FactTable`]
//! - downstream charting/table adapters via `serde`
//!
//! Every row in a [`FactTable`] has the same fixed column set (see [`Column`]), whether it was
//! loaded from the source or synthesized by the aggregator.

#![forbid(unsafe_code)]

mod boundary;
mod calendar;
mod error;
mod fact;
mod table;

pub use crate::boundary::{BoundaryConstants, CalendarBounds, GrainBounds, SelectableRange};
pub use crate::calendar::{
    last_day_of_month, last_day_of_quarter, last_day_of_year, quarter_of_month, week_of_year,
    CalendarEntryType, CalendarFields, CalendarScheme, Granularity,
};
pub use crate::error::{ModelError, ModelResult};
pub use crate::fact::{Cell, Column, FactRow, HierarchyLevels, MeasureType, RowOrigin, MAX_DEPTH};
pub use crate::table::FactTable;
