use thiserror::Error;

/// Errors from wire encoding and decoding.
#[derive(Debug, Error)]
pub enum WireError {
    /// A value could not be serialized.
    #[error("failed to encode wire payload: {0}")]
    Encode(#[source] serde_json::Error),
    /// The payload was malformed, missing its discriminator, or carried an
    /// unrecognized discriminator value.
    #[error("failed to decode wire payload: {0}")]
    Decode(#[source] serde_json::Error),
}
