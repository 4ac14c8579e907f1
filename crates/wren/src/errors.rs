use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChatError {
    /// Missing or invalid configuration. Fatal for the affected call and
    /// never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A model call failed after the retry budget was spent. Carries the
    /// last error message from the provider boundary.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A write or directory creation failed while materializing a
    /// generated project.
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
