//! Cluster facade over the protocol stack.
//!
//! A cluster instance exists per endpoint and per role. Converters only see
//! this trait: it performs no value translation and holds no converter state.

use super::{ZclAttribute, ZclCommand, ZclValue};
use crate::error::ZclError;
use std::sync::Arc;
use strum::{Display, FromRepr};

/// Known cluster domains, keyed by ZCL cluster identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr, Display)]
#[repr(u16)]
pub enum ZclClusterType {
    Basic = 0x0000,
    OnOff = 0x0006,
    MultistateInputBasic = 0x0012,
    MultistateOutputBasic = 0x0013,
}

impl ZclClusterType {
    pub fn id(&self) -> u16 {
        *self as u16
    }

    pub fn from_id(cluster_id: u16) -> Option<Self> {
        Self::from_repr(cluster_id)
    }
}

/// Receives attribute change notifications from a cluster.
pub trait ZclAttributeListener: Send + Sync {
    /// Called with a copy of the attribute after its last value changed.
    fn attribute_updated(&self, attribute: &ZclAttribute);
}

/// Receives commands a device issued from a cluster.
pub trait ZclCommandListener: Send + Sync {
    fn command_received(&self, command: &ZclCommand);
}

/// One cluster of one endpoint, in server (input) or client (output) role.
///
/// Every request method is fire-and-forget: `Ok` means the request was
/// queued, and any resulting value arrives later through the listeners.
pub trait ZclCluster: Send + Sync {
    fn cluster_type(&self) -> ZclClusterType;

    fn cluster_id(&self) -> u16 {
        self.cluster_type().id()
    }

    /// `true` for the input (server) role, `false` for the output (client) role.
    fn is_server(&self) -> bool;

    /// Ask the device to report changes of this cluster to us.
    fn bind(&self) -> Result<(), ZclError>;

    /// Returns `false` if the listener is already registered.
    fn add_attribute_listener(&self, listener: Arc<dyn ZclAttributeListener>) -> bool;

    /// Returns `false` if the listener was not registered.
    fn remove_attribute_listener(&self, listener: &Arc<dyn ZclAttributeListener>) -> bool;

    /// Returns `false` if the listener is already registered.
    fn add_command_listener(&self, listener: Arc<dyn ZclCommandListener>) -> bool;

    /// Returns `false` if the listener was not registered.
    fn remove_command_listener(&self, listener: &Arc<dyn ZclCommandListener>) -> bool;

    /// Snapshot of an attribute including its last known value.
    fn attribute(&self, attribute_id: u16) -> Option<ZclAttribute>;

    fn read_attribute(&self, attribute_id: u16) -> Result<(), ZclError>;

    fn write_attribute(&self, attribute_id: u16, value: ZclValue) -> Result<(), ZclError>;

    fn send_command(&self, command: ZclCommand) -> Result<(), ZclError>;
}
