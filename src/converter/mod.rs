//! Channel converters.
//!
//! A converter binds one host channel to the one or two clusters realising
//! it on an endpoint. It subscribes to attribute reports and device commands,
//! translates them into channel state, and turns host commands into cluster
//! requests.
//!
//! Lifecycle: constructed (`Uninitialized`) → `initialize_converter`
//! (`Bound`) → `dispose_converter` (`Disposed`). A converter that finds no
//! cluster goes straight to `Disposed`. Nothing leaves `Disposed`.

mod base;
mod binding;
#[cfg(test)]
mod fixtures;
pub mod multistate;
pub mod registry;
pub mod switch_trigger;
pub mod translate;

pub use base::{ConverterBase, ConverterContext};
pub use binding::ClusterBinding;
pub use multistate::ZigBeeConverterMultistate;
pub use registry::{ActiveConverter, ConverterFactory, ConverterRegistry};
pub use switch_trigger::ZigBeeConverterSwitchTrigger;

use crate::error::ConverterError;
use crate::thing::{Channel, HostCommand, ThingUid};
use crate::zcl::{ZclAttributeListener, ZclCommandListener, ZigBeeEndpoint};
use std::sync::Arc;
use strum::FromRepr;

/// Lifecycle state of a converter instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr)]
#[repr(u8)]
pub enum ConverterState {
    Uninitialized = 0,
    Bound = 1,
    Disposed = 2,
}

/// Capability every channel converter implements.
///
/// Converters are invoked concurrently: attribute reports and device commands
/// arrive on the protocol stack's threads while host commands arrive on the
/// host's. No ordering holds between an outbound command and the report
/// confirming it.
pub trait ZigBeeChannelConverter: ZclAttributeListener + ZclCommandListener + Send + Sync {
    /// Channel type id this converter provides, without the binding prefix.
    fn channel_type_id(&self) -> &'static str;

    /// Open the clusters backing `channel`, bind them and register this
    /// converter as their listener.
    ///
    /// Fails with [`ConverterError::ClusterUnavailable`] when the endpoint has
    /// neither cluster role. Bind failures are logged, never returned.
    fn initialize_converter(self: Arc<Self>, channel: &Channel) -> Result<(), ConverterError>;

    /// Channel this converter would provide on `endpoint`, or `None` when no
    /// backing cluster exists. Performs no I/O.
    fn channel(&self, thing_uid: &ThingUid, endpoint: &dyn ZigBeeEndpoint) -> Option<Channel>;

    /// Re-request the current values from the server cluster.
    fn handle_refresh(&self);

    /// Apply a host command. Commands the converter does not act on are ignored.
    fn handle_command(&self, command: &HostCommand);

    /// Remove every listener registration. Safe to call repeatedly.
    fn dispose_converter(&self);

    fn state(&self) -> ConverterState;
}
