use crate::fact::MAX_DEPTH;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("hierarchy level H{level} is populated but a shallower level is empty")]
    HierarchyGap { level: usize },

    #[error("hierarchy path has {depth} levels; at most {max} are supported", max = MAX_DEPTH)]
    HierarchyTooDeep { depth: usize },

    #[error("hierarchy level H{level} is an empty string")]
    EmptyLevel { level: usize },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}
