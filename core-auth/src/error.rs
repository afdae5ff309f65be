use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Session storage unavailable: {0}")]
    StorageUnavailable(#[source] BridgeError),

    #[error("Failed to encode profile: {0}")]
    ProfileEncoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
