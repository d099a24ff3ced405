use crate::aggregate::Aggregator;
use crate::catalog::{DataCatalog, Dataset, DatasetVariant};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::hierarchy::{HierarchyOption, HierarchyPath};
use crate::measure::filter_measures;
use crate::path_filter::{candidate_rows, filter_hierarchy};
use crate::selection::{HierarchySelection, TimeSelection, VariableSelection};
use crate::time::{resolve, TimeWindow};
use chrono::{Local, NaiveDateTime};
use lru::LruCache;
use opg_model::FactTable;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

/// One dashboard request against one dataset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub dataset: String,
    pub hierarchy: HierarchySelection,
    pub time: TimeSelection,
    #[serde(default)]
    pub variables: Option<VariableSelection>,
}

impl Query {
    pub fn new(
        dataset: impl Into<String>,
        hierarchy: HierarchySelection,
        time: TimeSelection,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            hierarchy,
            time,
            variables: None,
        }
    }

    pub fn with_variables(mut self, variables: VariableSelection) -> Self {
        self.variables = Some(variables);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    dataset: String,
    generation: u64,
    hierarchy: HierarchySelection,
    window: TimeWindow,
    variables: Option<VariableSelection>,
}

/// Runs queries against a [`DataCatalog`], memoizing results per resolved selection.
#[derive(Debug)]
pub struct QueryEngine {
    catalog: Arc<DataCatalog>,
    config: EngineConfig,
    cache: Option<Mutex<LruCache<CacheKey, FactTable>>>,
}

impl QueryEngine {
    pub fn new(catalog: Arc<DataCatalog>, config: EngineConfig) -> Self {
        let cache = NonZeroUsize::new(config.result_cache_entries)
            .map(|cap| Mutex::new(LruCache::new(cap)));
        Self {
            catalog,
            config,
            cache,
        }
    }

    pub fn catalog(&self) -> &Arc<DataCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `query` relative to the local wall clock.
    pub fn query(&self, query: &Query) -> EngineResult<FactTable> {
        self.query_at(query, Local::now().naive_local())
    }

    /// Run `query` as if the current time were `now`.
    pub fn query_at(&self, query: &Query, now: NaiveDateTime) -> EngineResult<FactTable> {
        let dataset = self.catalog.get(&query.dataset)?;
        if let Some(path) = query.hierarchy.path() {
            dataset.tree().exists(path)?;
        }

        let window = resolve(&query.time, dataset.bounds(), now);
        let key = CacheKey {
            dataset: query.dataset.clone(),
            generation: dataset.generation(),
            hierarchy: query.hierarchy.clone(),
            window,
            variables: query.variables.clone(),
        };

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                log::debug!("result cache hit for {}", query.dataset);
                return Ok(hit.clone());
            }
        }

        log::debug!("result cache miss for {}", query.dataset);
        let result = execute(
            &dataset,
            &key.hierarchy,
            &key.window,
            key.variables.as_ref(),
        );

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, result.clone());
        }
        Ok(result)
    }

    /// Number of memoized results currently held.
    pub fn cached_results(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| {
            cache.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    /// Children of `path` in `dataset`'s current hierarchy.
    pub fn hierarchy_options(
        &self,
        dataset: &str,
        path: &HierarchyPath,
    ) -> EngineResult<Vec<HierarchyOption>> {
        let dataset = self.catalog.get(dataset)?;
        dataset.tree().exists(path)?;
        Ok(dataset.tree().children(path).to_vec())
    }

    /// Decode a UI path string using the configured delimiter.
    pub fn parse_path(&self, encoded: &str) -> EngineResult<HierarchyPath> {
        HierarchyPath::parse(encoded, &self.config.path_delimiter)
    }

    pub fn encode_path(&self, path: &HierarchyPath) -> String {
        path.encode(&self.config.path_delimiter)
    }
}

/// Evaluate a resolved selection against one dataset snapshot.
///
/// Pre-aggregated datasets are filtered by hierarchy and then by time. Hierarchical datasets
/// collect the rows under the selection, roll them up to the window's grain and apply the
/// window to the synthesized rows.
pub fn execute(
    dataset: &Dataset,
    hierarchy: &HierarchySelection,
    window: &TimeWindow,
    variables: Option<&VariableSelection>,
) -> FactTable {
    let selected = match dataset.variant() {
        DatasetVariant::PreAggregated => window.apply(&filter_hierarchy(dataset.table(), hierarchy)),
        DatasetVariant::Hierarchical => match window.granularity() {
            Some(granularity) => {
                let candidates = candidate_rows(dataset.table(), hierarchy);
                let aggregated = Aggregator::new(granularity).aggregate(&candidates, window.year_span());
                window.apply(&aggregated)
            }
            None => FactTable::new(),
        },
    };
    let out = match variables {
        Some(variables) => filter_measures(&selected, variables),
        None => selected,
    };
    log::debug!(
        "{} returned {} rows for {hierarchy:?}",
        dataset.name(),
        out.row_count()
    );
    out
}
