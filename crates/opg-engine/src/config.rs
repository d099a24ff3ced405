use serde::{Deserialize, Serialize};

/// Separator used in the string form of a hierarchy path (`root^||^A^||^B`).
pub const DEFAULT_PATH_DELIMITER: &str = "^||^";

/// Leading token of every encoded hierarchy path.
pub const ROOT_TOKEN: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Delimiter for [`crate::HierarchyPath::encode`] and [`crate::HierarchyPath::parse`]
    /// (default: `^||^`).
    pub path_delimiter: String,
    /// Max number of memoized query results per engine; `0` disables the cache (default: 64).
    pub result_cache_entries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_delimiter: DEFAULT_PATH_DELIMITER.to_string(),
            result_cache_entries: 64,
        }
    }
}
