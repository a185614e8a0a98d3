// shared/src/lib.rs

/// Failures raised by a store round-trip.
///
/// These pass through the gateway unchanged, so callers can match on the
/// store-native kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("value is not an integer or out of range")]
    NotAnInteger,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot decode value at '{key}': {reason}")]
    Decode { key: String, reason: String },
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("deserialization: {0}")]
    Deserialization(String),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// The store error carried by this error, if it came from a store call.
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            Error::Store(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub mod config;
