use crate::error::{EngineError, EngineResult};
use crate::hierarchy::HierarchyTree;
use opg_model::{BoundaryConstants, FactTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// How a dataset stores its roll-ups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetVariant {
    /// Every (path, grain) roll-up is materialized as its own row; queries only select.
    #[default]
    PreAggregated,
    /// Rows are individual events; roll-ups are synthesized at query time.
    Hierarchical,
}

/// A freshly loaded table, before boundary constants and the hierarchy tree are derived.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDataset {
    pub table: FactTable,
    pub variant: DatasetVariant,
}

impl LoadedDataset {
    pub fn new(table: FactTable, variant: DatasetVariant) -> Self {
        Self { table, variant }
    }
}

/// Upstream producer of fact tables.
///
/// Implementations may be slow (database queries, file parsing); the catalog never calls
/// them while holding its lock.
pub trait DatasetSource: fmt::Debug + Send + Sync {
    fn load(&self, name: &str) -> EngineResult<LoadedDataset>;
}

/// A [`DatasetSource`] backed by tables already in memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    datasets: RwLock<HashMap<String, LoadedDataset>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(self, name: impl Into<String>, dataset: LoadedDataset) -> Self {
        self.insert(name, dataset);
        self
    }

    /// Add or replace a dataset. Already-loaded catalog entries are unaffected until reloaded.
    pub fn insert(&self, name: impl Into<String>, dataset: LoadedDataset) {
        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), dataset);
    }

    pub fn remove(&self, name: &str) -> Option<LoadedDataset> {
        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }
}

impl DatasetSource for InMemorySource {
    fn load(&self, name: &str) -> EngineResult<LoadedDataset> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownDataset(name.to_string()))
    }
}

impl<S: DatasetSource + ?Sized> DatasetSource for Arc<S> {
    fn load(&self, name: &str) -> EngineResult<LoadedDataset> {
        (**self).load(name)
    }
}

/// An immutable snapshot of one dataset: the table plus everything derived from it.
#[derive(Debug)]
pub struct Dataset {
    name: String,
    table: FactTable,
    tree: HierarchyTree,
    bounds: BoundaryConstants,
    variant: DatasetVariant,
    generation: u64,
}

impl Dataset {
    /// Derive boundary constants and the hierarchy tree for `loaded`.
    pub fn build(name: impl Into<String>, loaded: LoadedDataset, generation: u64) -> Self {
        let LoadedDataset { table, variant } = loaded;
        let bounds = match variant {
            DatasetVariant::PreAggregated => BoundaryConstants::from_table(&table),
            DatasetVariant::Hierarchical => BoundaryConstants::from_date_span(&table),
        };
        let tree = HierarchyTree::build(&table);
        Self {
            name: name.into(),
            table,
            tree,
            bounds,
            variant,
            generation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &FactTable {
        &self.table
    }

    pub fn tree(&self) -> &HierarchyTree {
        &self.tree
    }

    pub fn bounds(&self) -> &BoundaryConstants {
        &self.bounds
    }

    pub fn variant(&self) -> DatasetVariant {
        self.variant
    }

    /// Increases every time the catalog (re)builds a dataset.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-session registry of loaded datasets.
///
/// Readers get an `Arc<Dataset>` snapshot and keep it for as long as they need; a reload builds
/// the replacement without holding the lock and swaps it in with a single write.
pub struct DataCatalog {
    source: Box<dyn DatasetSource>,
    datasets: RwLock<HashMap<String, Arc<Dataset>>>,
    generation: AtomicU64,
}

impl fmt::Debug for DataCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataCatalog")
            .field("source", &self.source)
            .field("datasets", &self.dataset_names())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl DataCatalog {
    pub fn new(source: impl DatasetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            datasets: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// The current snapshot of `name`, loading it on first access.
    pub fn get(&self, name: &str) -> EngineResult<Arc<Dataset>> {
        if let Some(dataset) = self.cached(name) {
            return Ok(dataset);
        }
        let built = Arc::new(self.build(name)?);
        let mut datasets = self
            .datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we were building; keep the first one.
        let dataset = Arc::clone(datasets.entry(name.to_string()).or_insert(built));
        Ok(dataset)
    }

    /// Rebuild `name` from the source and atomically replace the current snapshot.
    ///
    /// On failure the previous snapshot (if any) stays in place. When reloads overlap, the one
    /// that started last wins: a slower, older reload returns the newer snapshot instead of
    /// replacing it.
    pub fn reload(&self, name: &str) -> EngineResult<Arc<Dataset>> {
        let built = Arc::new(self.build(name)?);
        let mut datasets = self
            .datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = datasets.get(name) {
            if current.generation() > built.generation() {
                log::debug!(
                    "discarding reload of {name} at generation {}; generation {} is newer",
                    built.generation(),
                    current.generation()
                );
                return Ok(Arc::clone(current));
            }
        }
        datasets.insert(name.to_string(), Arc::clone(&built));
        Ok(built)
    }

    /// Drop the snapshot of `name`; returns whether one was loaded.
    pub fn evict(&self, name: &str) -> bool {
        self.datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Names of the currently loaded datasets, sorted.
    pub fn dataset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn cached(&self, name: &str) -> Option<Arc<Dataset>> {
        self.datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn build(&self, name: &str) -> EngineResult<Dataset> {
        // Taken before loading so generations follow the order in which loads started.
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let loaded = self.source.load(name).inspect_err(|err| {
            log::warn!("loading dataset {name} failed: {err}");
        })?;
        let dataset = Dataset::build(name, loaded, generation);
        log::info!(
            "loaded dataset {name}: {} rows, {} hierarchy nodes, generation {generation}",
            dataset.table.row_count(),
            dataset.tree.node_count(),
        );
        Ok(dataset)
    }
}
