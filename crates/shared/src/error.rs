use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid device id: {0}")]
    InvalidDeviceId(String),
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("control catalog is empty")]
    Empty,
    #[error("control '{name}' has min_value {min_value} above max_value {max_value}")]
    InvalidRange {
        name: String,
        min_value: i64,
        max_value: i64,
    },
    #[error("control '{name}' has a negative value range")]
    NegativeRange { name: String },
    #[error("control '{name}' appears more than once")]
    Duplicate { name: String },
}
