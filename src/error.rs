use thiserror::Error;

pub type FractalResult<T> = Result<T, FractalError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FractalError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// `]` reached with nothing saved. `position` is the symbol index in the
    /// expanded instruction string.
    #[error("stack underflow: pop at instruction {position} with an empty save stack")]
    StackUnderflow { position: usize },

    #[error("{resource} of {requested} exceeds the limit of {limit}")]
    ResourceExceeded {
        resource: &'static str,
        limit: u64,
        requested: u64,
    },

    #[error("cancelled after {completed} steps")]
    Cancelled { completed: usize },

    #[error("definition error at line {line}: {message}")]
    Definition { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl FractalError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn definition(line: usize, message: impl Into<String>) -> Self {
        Self::Definition {
            line,
            message: message.into(),
        }
    }
}
