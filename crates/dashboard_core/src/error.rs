use thiserror::Error;

/// Why a fetch task produced no data for its section.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid endpoint url {endpoint}: {source}")]
    InvalidUrl {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Malformed { endpoint, .. }
            | FetchError::InvalidUrl { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column {column} is out of range for a table with {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },
    #[error("column {column} is not sortable")]
    NotSortable { column: usize },
    #[error("no table registered as {0}")]
    UnknownTable(String),
}
