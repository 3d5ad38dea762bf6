use crate::converter::ConverterState;
use crate::zcl::ZclClusterType;
use thiserror::Error as ThisError;

/// Errors reported by the protocol-facing cluster adapter.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ZclError {
    #[error("Bind request for cluster {cluster} failed: {reason}")]
    BindFailed {
        cluster: ZclClusterType,
        reason: String,
    },

    #[error("Attribute 0x{attribute:04X} is not supported by cluster {cluster}")]
    UnsupportedAttribute {
        cluster: ZclClusterType,
        attribute: u16,
    },

    #[error("Attribute 0x{attribute:04X} of cluster {cluster} is read-only")]
    ReadOnlyAttribute {
        cluster: ZclClusterType,
        attribute: u16,
    },

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Errors reported by a channel converter.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ConverterError {
    #[error("No cluster for channel {channel_type} on endpoint {endpoint}")]
    ClusterUnavailable {
        endpoint: String,
        channel_type: String,
    },

    #[error("Converter is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: ConverterState,
        actual: ConverterState,
    },
}

#[derive(ThisError, Debug)]
pub enum BridgeError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
