use crate::config::{DEFAULT_PATH_DELIMITER, ROOT_TOKEN};
use crate::error::{EngineError, EngineResult};
use opg_model::{FactTable, HierarchyLevels, ModelError, ModelResult, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A node of the dimension hierarchy, as the ordered values of `H0..H{k-1}`.
///
/// The empty path is the root. A path never has more than [`MAX_DEPTH`] segments and no
/// segment is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct HierarchyPath(Vec<String>);

impl HierarchyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.len() > MAX_DEPTH {
            return Err(ModelError::HierarchyTooDeep {
                depth: segments.len(),
            });
        }
        if let Some(level) = segments.iter().position(String::is_empty) {
            return Err(ModelError::EmptyLevel { level });
        }
        Ok(Self(segments))
    }

    /// The populated levels of a row.
    pub fn from_levels(levels: &HierarchyLevels) -> Self {
        Self(levels.segments().map(str::to_string).collect())
    }

    pub fn child(&self, label: impl Into<String>) -> ModelResult<Self> {
        if self.0.len() == MAX_DEPTH {
            return Err(ModelError::HierarchyTooDeep {
                depth: MAX_DEPTH + 1,
            });
        }
        let label = label.into();
        if label.is_empty() {
            return Err(ModelError::EmptyLevel {
                level: self.0.len(),
            });
        }
        let mut segments = self.0.clone();
        segments.push(label);
        Ok(Self(segments))
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Encode as `root<delim>A<delim>B`.
    pub fn encode(&self, delimiter: &str) -> String {
        let mut out = String::from(ROOT_TOKEN);
        for segment in &self.0 {
            out.push_str(delimiter);
            out.push_str(segment);
        }
        out
    }

    /// Inverse of [`HierarchyPath::encode`].
    pub fn parse(encoded: &str, delimiter: &str) -> EngineResult<Self> {
        let not_found = || EngineError::NotFound {
            path: encoded.to_string(),
        };
        if delimiter.is_empty() {
            return Err(not_found());
        }
        let mut parts = encoded.split(delimiter);
        if parts.next() != Some(ROOT_TOKEN) {
            return Err(not_found());
        }
        let segments: Vec<&str> = parts.collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(not_found());
        }
        Ok(Self::new(segments)?)
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(DEFAULT_PATH_DELIMITER))
    }
}

impl TryFrom<Vec<String>> for HierarchyPath {
    type Error = ModelError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HierarchyPath> for Vec<String> {
    fn from(value: HierarchyPath) -> Self {
        value.0
    }
}

/// A selectable child of a hierarchy node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyOption {
    pub label: String,
    pub value: HierarchyPath,
}

/// Precomputed parent/child structure over the `H0..H5` columns of one dataset.
///
/// Every populated prefix of every row is a node; the root always exists. The tree is rebuilt
/// together with the table whenever a dataset is (re)loaded and is immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyTree {
    nodes: BTreeMap<HierarchyPath, Vec<HierarchyOption>>,
}

impl HierarchyTree {
    pub fn build(table: &FactTable) -> Self {
        let distinct: HashSet<&HierarchyLevels> = table.iter().map(|r| &r.hierarchy).collect();

        let mut children: BTreeMap<HierarchyPath, BTreeSet<String>> = BTreeMap::new();
        children.insert(HierarchyPath::root(), BTreeSet::new());
        for levels in distinct {
            let mut path = HierarchyPath::root();
            for segment in levels.segments() {
                children
                    .entry(path.clone())
                    .or_default()
                    .insert(segment.to_string());
                path.0.push(segment.to_string());
                children.entry(path.clone()).or_default();
            }
        }

        let nodes = children
            .into_iter()
            .map(|(path, labels)| {
                let options = labels
                    .into_iter()
                    .map(|label| {
                        let mut value = path.clone();
                        value.0.push(label.clone());
                        HierarchyOption { label, value }
                    })
                    .collect();
                (path, options)
            })
            .collect();
        Self { nodes }
    }

    /// Children of `path` ordered by label; empty for leaves and unknown paths.
    pub fn children(&self, path: &HierarchyPath) -> &[HierarchyOption] {
        self.nodes.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` for a known node that no row extends further. Unknown paths are not leaves.
    pub fn is_leaf(&self, path: &HierarchyPath) -> bool {
        self.nodes.get(path).is_some_and(Vec::is_empty)
    }

    pub fn contains(&self, path: &HierarchyPath) -> bool {
        self.nodes.contains_key(path)
    }

    /// Fail with [`EngineError::NotFound`] when `path` is not a node of this tree.
    pub fn exists(&self, path: &HierarchyPath) -> EngineResult<()> {
        if self.contains(path) {
            Ok(())
        } else {
            Err(EngineError::NotFound {
                path: path.to_string(),
            })
        }
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest populated level count across all rows (0 when no row has a hierarchy).
    pub fn max_depth(&self) -> usize {
        self.nodes.keys().map(HierarchyPath::depth).max().unwrap_or(0)
    }

    /// Distinct values of `H{level}`, sorted.
    pub fn level_values(&self, level: usize) -> Vec<String> {
        let values: BTreeSet<&str> = self
            .nodes
            .keys()
            .filter(|path| path.depth().checked_sub(1) == Some(level))
            .filter_map(HierarchyPath::last)
            .collect();
        values.into_iter().map(str::to_string).collect()
    }
}
