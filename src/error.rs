use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Fatal errors raised while loading the catalog artifacts at startup
#[derive(thiserror::Error, Debug)]
pub enum DatasetLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error(
        "Row count mismatch: table has {table} rows, embeddings {embeddings}, clusters {clusters}"
    )]
    RowCountMismatch {
        table: usize,
        embeddings: usize,
        clusters: usize,
    },

    #[error("Embedding row {row} has width {found}, expected {expected}")]
    EmbeddingWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row} has an empty title")]
    EmptyTitle { row: usize },

    #[error("Row {row} has an invalid cluster label '{value}'")]
    InvalidCluster { row: usize, value: String },

    #[error("No cluster labels: configure a clusters artifact or add a 'cluster' column")]
    MissingClusters,

    #[error("Catalog is empty")]
    EmptyCatalog,
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetLoadError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Dataset(_) | AppError::Io(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
