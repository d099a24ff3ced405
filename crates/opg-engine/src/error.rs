use opg_model::ModelError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The selected hierarchy path does not exist in the current dataset, usually because the
    /// selection was made against a dataset that has since been reloaded.
    #[error("hierarchy path not found: {path}")]
    NotFound { path: String },

    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    /// Raised by [`DatasetSource`](crate::DatasetSource) implementations backed by files or
    /// services when the dataset exists but cannot be read.
    #[error("failed to load dataset {dataset}: {message}")]
    Load { dataset: String, message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EngineError {
    /// Whether the caller can recover by resetting its selection (e.g. back to the hierarchy
    /// root) and retrying against the same dataset.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}
