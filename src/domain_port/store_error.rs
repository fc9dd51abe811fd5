#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,
    #[error("duplicate entry: {0}")]
    Duplicate(String),
    #[error("store unavailable: {0}")]
    Connection(String),
    #[error("malformed row: {0}")]
    Malformed(String),
}
