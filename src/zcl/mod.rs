//! Endpoint/cluster adapter for the ZigBee protocol stack.
//!
//! This module exposes what the converters consume from the stack:
//! - `ZigBeeEndpoint`: cluster lookup by numeric identifier and role
//! - `ZclCluster`: bind, listener registration, attribute access, requests
//! - `ListenerSet`: the fan-out primitive behind attribute/command delivery
//! - `local`: an in-process stack used by the simulation binary and tests

mod attribute;
mod cluster;
mod command;
pub mod clusters;
pub mod dispatch;
pub mod listeners;
pub mod local;

pub use attribute::{ZclAttribute, ZclDataType, ZclValue};
pub use cluster::{ZclAttributeListener, ZclCluster, ZclClusterType, ZclCommandListener};
pub use command::{OnOffCommand, ZclCommand};
pub use listeners::ListenerSet;

use std::fmt;
use std::sync::Arc;

/// 64-bit IEEE (MAC) address of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct IeeeAddress(pub u64);

impl fmt::Display for IeeeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl std::str::FromStr for IeeeAddress {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(hex, 16).map(IeeeAddress)
    }
}

/// Address of an endpoint: parent node network address plus endpoint number.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EndpointAddress {
    pub network_address: u16,
    pub endpoint_id: u8,
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_address, self.endpoint_id)
    }
}

/// A logical device feature instance on a node.
pub trait ZigBeeEndpoint: Send + Sync {
    fn address(&self) -> EndpointAddress;

    fn ieee_address(&self) -> IeeeAddress;

    fn endpoint_id(&self) -> u8 {
        self.address().endpoint_id
    }

    /// Server-role cluster with the given identifier.
    fn input_cluster(&self, cluster_id: u16) -> Option<Arc<dyn ZclCluster>>;

    /// Client-role cluster with the given identifier.
    fn output_cluster(&self, cluster_id: u16) -> Option<Arc<dyn ZclCluster>>;

    fn input_cluster_ids(&self) -> Vec<u16>;

    fn output_cluster_ids(&self) -> Vec<u16>;
}
