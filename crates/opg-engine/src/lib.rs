//! Filter and aggregation engine for OPG fact tables.
//!
//! A query pairs a hierarchy selection (a level, a node, or a node's children) with a time
//! selection (all time, a trailing window, or an explicit range). Pre-aggregated datasets are
//! answered by selecting materialized roll-up rows; hierarchical datasets are answered by
//! summing event rows into synthesized roll-ups on the fly. Either way the result is a
//! [`opg_model::FactTable`] with the same fixed column set.
//!
//! Datasets live in a [`DataCatalog`], which swaps whole snapshots on reload so in-flight
//! queries never see a table paired with another table's hierarchy tree.

#![forbid(unsafe_code)]

mod aggregate;
mod catalog;
mod config;
mod error;
mod hierarchy;
mod measure;
mod path_filter;
mod query;
mod selection;
mod time;

pub use crate::aggregate::{Aggregator, BucketKey};
pub use crate::catalog::{
    DataCatalog, Dataset, DatasetSource, DatasetVariant, InMemorySource, LoadedDataset,
};
pub use crate::config::{EngineConfig, DEFAULT_PATH_DELIMITER, ROOT_TOKEN};
pub use crate::error::{EngineError, EngineResult};
pub use crate::hierarchy::{HierarchyOption, HierarchyPath, HierarchyTree};
pub use crate::measure::filter_measures;
pub use crate::path_filter::{candidate_rows, filter_hierarchy, selects_rollup};
pub use crate::query::{execute, Query, QueryEngine};
pub use crate::selection::{HierarchySelection, PeriodType, TimeSelection, VariableSelection};
pub use crate::time::{clamp_periods, resolve, TimeWindow};
