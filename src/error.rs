use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  /// The request never produced a response (connection, TLS, body read).
  #[error("transport failure: {0}")]
  Transport(#[from] reqwest::Error),
  /// A response arrived, but not with a success status.
  #[error("http status {0}")]
  Http(u16),
  /// The remote side answered with an `errors` payload.
  #[error("api errors: {0}")]
  Api(String),
  /// The response was missing fields we rely on.
  #[error("unexpected response format: {0}")]
  Schema(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Csv(#[from] csv::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("report is missing the {0:?} column")]
  MissingColumn(String),
  #[error("invalid request header {0:?}")]
  InvalidHeader(String),
}

impl SyncError {
  /// Transport-level failures, as opposed to answers we could not use.
  pub fn is_transport(&self) -> bool {
    matches!(self, SyncError::Transport(_) | SyncError::Http(_))
  }
}

pub type Result<T> = std::result::Result<T, SyncError>;
