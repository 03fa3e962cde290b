/// Convenience result type used across the engine.
pub type TableResult<T> = Result<T, TableError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    /// Missing or invalid configuration for an operation (base path, base
    /// document, unknown template key).
    #[error("configuration error: {0}")]
    Config(String),

    /// Errors while resolving or looking up schema references.
    #[error("resolution error: {0}")]
    Resolve(String),

    /// Errors while executing a template for a render task.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid user-provided schema or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TableError {
    /// Build a [`TableError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`TableError::Resolve`] value.
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Build a [`TableError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TableError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
