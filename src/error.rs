use thiserror::Error;

#[derive(Debug, Error)]
pub enum VrStatsError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("config invalid: {0}")]
    InvalidConfig(String),
    #[error("spreadsheet {path} has no readable worksheet")]
    EmptyWorkbook { path: String },
    #[error("spreadsheet {path} is missing column `{column}`")]
    MissingColumn { path: String, column: String },
}
