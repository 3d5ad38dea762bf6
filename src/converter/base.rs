//! State and behaviour common to every converter.

use super::ConverterState;
use super::binding::ClusterBinding;
use crate::config::BindingConfig;
use crate::constants::CHANNEL_PROPERTY_ENDPOINT;
use crate::error::ConverterError;
use crate::thing::{
    Channel, ChannelTypeUid, ChannelUid, ItemType, State, ThingHandlerCallback, ThingUid,
};
use crate::zcl::{
    IeeeAddress, ZclAttributeListener, ZclCluster, ZclCommandListener, ZigBeeEndpoint,
};
use log::{debug, error};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

/// Everything a converter needs from its surroundings, injected at
/// construction.
#[derive(Clone)]
pub struct ConverterContext {
    pub thing_uid: ThingUid,
    pub endpoint: Arc<dyn ZigBeeEndpoint>,
    pub callback: Arc<dyn ThingHandlerCallback>,
    pub config: Arc<BindingConfig>,
}

/// Lifecycle, channel identity and cluster binding of one converter.
///
/// The concrete converters embed this and only add their translation rules.
pub struct ConverterBase {
    context: ConverterContext,
    channel_type_id: &'static str,
    channel_uid: OnceLock<ChannelUid>,
    binding: OnceLock<ClusterBinding>,
    state: AtomicU8,
}

impl ConverterBase {
    pub fn new(context: ConverterContext, channel_type_id: &'static str) -> Self {
        Self {
            context,
            channel_type_id,
            channel_uid: OnceLock::new(),
            binding: OnceLock::new(),
            state: AtomicU8::new(ConverterState::Uninitialized as u8),
        }
    }

    pub fn ieee(&self) -> IeeeAddress {
        self.context.endpoint.ieee_address()
    }

    pub fn endpoint(&self) -> &Arc<dyn ZigBeeEndpoint> {
        &self.context.endpoint
    }

    pub fn config(&self) -> &BindingConfig {
        &self.context.config
    }

    pub fn channel_uid(&self) -> Option<&ChannelUid> {
        self.channel_uid.get()
    }

    pub fn state(&self) -> ConverterState {
        // Only valid discriminants are ever stored
        ConverterState::from_repr(self.state.load(Ordering::SeqCst))
            .unwrap_or(ConverterState::Disposed)
    }

    pub fn is_bound(&self) -> bool {
        self.state() == ConverterState::Bound
    }

    /// Whether inbound events should still reach the channel.
    pub fn is_active(&self) -> bool {
        self.state() != ConverterState::Disposed && self.channel_uid.get().is_some()
    }

    pub fn binding(&self) -> Option<&ClusterBinding> {
        self.binding.get()
    }

    /// Server cluster of a bound converter.
    pub fn server_cluster(&self) -> Option<&Arc<dyn ZclCluster>> {
        if !self.is_bound() {
            return None;
        }
        self.binding.get().and_then(|b| b.server())
    }

    /// Build the channel description for this converter on `endpoint`.
    pub fn create_channel(
        &self,
        thing_uid: &ThingUid,
        endpoint: &dyn ZigBeeEndpoint,
        item_type: ItemType,
        label: &str,
    ) -> Channel {
        let id = format!(
            "{}_{}_{}",
            endpoint.ieee_address(),
            endpoint.endpoint_id(),
            self.channel_type_id
        );
        let mut properties = BTreeMap::new();
        properties.insert(
            CHANNEL_PROPERTY_ENDPOINT.to_string(),
            endpoint.endpoint_id().to_string(),
        );
        Channel {
            uid: ChannelUid::new(thing_uid, id),
            channel_type: ChannelTypeUid::new(
                &self.context.config.binding_id,
                self.channel_type_id,
            ),
            item_type,
            label: label.to_string(),
            properties,
        }
    }

    /// Open the server cluster `server_id` and client cluster `client_id`,
    /// bind them and register the listeners.
    ///
    /// Moves to `Bound` on success and to `Disposed` when no cluster exists.
    pub fn open(
        &self,
        channel: &Channel,
        server_id: u16,
        client_id: u16,
        attribute_listener: Arc<dyn ZclAttributeListener>,
        command_listener: Arc<dyn ZclCommandListener>,
    ) -> Result<&ClusterBinding, ConverterError> {
        let actual = self.state();
        if actual != ConverterState::Uninitialized {
            return Err(ConverterError::InvalidState {
                expected: ConverterState::Uninitialized,
                actual,
            });
        }

        let endpoint = self.context.endpoint.as_ref();
        let Some(binding) = ClusterBinding::locate(endpoint, server_id, client_id) else {
            error!(
                "{}: Error opening device {} controls",
                self.ieee(),
                self.channel_type_id
            );
            self.transition(ConverterState::Uninitialized, ConverterState::Disposed);
            return Err(ConverterError::ClusterUnavailable {
                endpoint: endpoint.address().to_string(),
                channel_type: channel.channel_type.to_string(),
            });
        };

        // Channel identity and binding are published before any listener is
        // registered, so events and a racing dispose both see them.
        let _ = self.channel_uid.set(channel.uid.clone());
        if self.binding.set(binding).is_err() {
            return Err(ConverterError::InvalidState {
                expected: ConverterState::Uninitialized,
                actual: self.state(),
            });
        }
        let Some(binding) = self.binding.get() else {
            return Err(ConverterError::InvalidState {
                expected: ConverterState::Uninitialized,
                actual: self.state(),
            });
        };

        if self.context.config.bind_clusters {
            binding.bind();
        }
        binding.register(&attribute_listener, &command_listener);

        if !self.transition(ConverterState::Uninitialized, ConverterState::Bound) {
            // Disposed while we were registering
            binding.release();
            return Err(ConverterError::InvalidState {
                expected: ConverterState::Uninitialized,
                actual: self.state(),
            });
        }

        debug!(
            "{}: Initialised device {} converter (server={}, client={})",
            self.ieee(),
            self.channel_type_id,
            binding.server().is_some(),
            binding.client().is_some()
        );
        Ok(binding)
    }

    /// Remove all listener registrations and move to `Disposed`.
    pub fn dispose(&self) {
        let previous = self.state.swap(ConverterState::Disposed as u8, Ordering::SeqCst);
        let removed = self.binding.get().map(|b| b.release()).unwrap_or(0);
        if previous != ConverterState::Disposed as u8 {
            debug!(
                "{}: Closing device {} converter, {} registration(s) removed",
                self.ieee(),
                self.channel_type_id,
                removed
            );
        }
    }

    /// Push a new channel state to the host.
    pub fn update_channel_state(&self, state: State) {
        if !self.is_active() {
            return;
        }
        if let Some(uid) = self.channel_uid.get() {
            debug!("{}: Updating channel {} to {}", self.ieee(), uid, state);
            self.context.callback.update_channel_state(uid, state);
        }
    }

    /// Fire the trigger channel once.
    pub fn trigger_channel(&self, event: &str) {
        if !self.is_active() {
            return;
        }
        if let Some(uid) = self.channel_uid.get() {
            debug!("{}: Triggering channel {} with {}", self.ieee(), uid, event);
            self.context.callback.trigger_channel(uid, event);
        }
    }

    fn transition(&self, from: ConverterState, to: ConverterState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
