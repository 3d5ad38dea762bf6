//! Channel type → converter factory table.

use super::{
    ConverterContext, ZigBeeChannelConverter, ZigBeeConverterMultistate,
    ZigBeeConverterSwitchTrigger,
};
use crate::config::BindingConfig;
use crate::constants::{CHANNEL_MULTISTATE, CHANNEL_SWITCH_TRIGGER};
use crate::thing::{Channel, ThingHandlerCallback, ThingUid};
use crate::zcl::ZigBeeEndpoint;
use log::{debug, info, warn};
use std::sync::Arc;

pub type ConverterFactory = fn(ConverterContext) -> Arc<dyn ZigBeeChannelConverter>;

/// A converter that initialised successfully, with the channel it owns.
#[derive(Clone)]
pub struct ActiveConverter {
    pub channel: Channel,
    pub converter: Arc<dyn ZigBeeChannelConverter>,
}

/// Known converters, in registration order.
pub struct ConverterRegistry {
    factories: Vec<(&'static str, ConverterFactory)>,
}

impl ConverterRegistry {
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Add a factory, replacing any previous one for the same channel type.
    pub fn register(&mut self, channel_type_id: &'static str, factory: ConverterFactory) {
        match self.factories.iter_mut().find(|(id, _)| *id == channel_type_id) {
            Some(entry) => entry.1 = factory,
            None => self.factories.push((channel_type_id, factory)),
        }
    }

    pub fn channel_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.iter().map(|(id, _)| *id)
    }

    pub fn create(
        &self,
        channel_type_id: &str,
        context: ConverterContext,
    ) -> Option<Arc<dyn ZigBeeChannelConverter>> {
        self.factories
            .iter()
            .find(|(id, _)| *id == channel_type_id)
            .map(|(_, factory)| factory(context))
    }

    /// Instantiate every converter the endpoint supports and initialise it.
    ///
    /// Converters without a backing cluster are never initialised. Converters
    /// that fail to initialise are disposed and left out.
    pub fn create_converters(
        &self,
        thing_uid: &ThingUid,
        endpoint: Arc<dyn ZigBeeEndpoint>,
        callback: Arc<dyn ThingHandlerCallback>,
        config: Arc<BindingConfig>,
    ) -> Vec<ActiveConverter> {
        let context = ConverterContext {
            thing_uid: thing_uid.clone(),
            endpoint: endpoint.clone(),
            callback,
            config,
        };

        let mut active = Vec::new();
        for (channel_type_id, factory) in &self.factories {
            let converter = factory(context.clone());
            let Some(channel) = converter.channel(thing_uid, endpoint.as_ref()) else {
                debug!(
                    "{}: Endpoint {} has no {} clusters",
                    endpoint.ieee_address(),
                    endpoint.endpoint_id(),
                    channel_type_id
                );
                continue;
            };

            match converter.clone().initialize_converter(&channel) {
                Ok(()) => {
                    info!(
                        "{}: Created {} channel {}",
                        endpoint.ieee_address(),
                        channel_type_id,
                        channel.uid
                    );
                    active.push(ActiveConverter { channel, converter });
                }
                Err(e) => {
                    warn!(
                        "{}: Failed to initialise {} converter: {}",
                        endpoint.ieee_address(),
                        channel_type_id,
                        e
                    );
                    converter.dispose_converter();
                }
            }
        }
        active
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CHANNEL_SWITCH_TRIGGER, ZigBeeConverterSwitchTrigger::create);
        registry.register(CHANNEL_MULTISTATE, ZigBeeConverterMultistate::create);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterState;
    use crate::converter::fixtures::Fixture;
    use crate::error::ConverterError;
    use crate::thing::{ChannelTypeUid, ChannelUid, HostCommand, ItemType};
    use crate::zcl::{
        ZclAttribute, ZclAttributeListener, ZclClusterType, ZclCommand, ZclCommandListener,
    };
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static BROKEN_DISPOSED: AtomicUsize = AtomicUsize::new(0);

    /// Offers a channel everywhere but never initialises.
    struct Broken;

    impl ZclAttributeListener for Broken {
        fn attribute_updated(&self, _attribute: &ZclAttribute) {}
    }

    impl ZclCommandListener for Broken {
        fn command_received(&self, _command: &ZclCommand) {}
    }

    impl ZigBeeChannelConverter for Broken {
        fn channel_type_id(&self) -> &'static str {
            "broken"
        }

        fn initialize_converter(self: Arc<Self>, _channel: &Channel) -> Result<(), ConverterError> {
            Err(ConverterError::ClusterUnavailable {
                endpoint: "0/0".to_string(),
                channel_type: "zigbee:broken".to_string(),
            })
        }

        fn channel(&self, thing_uid: &ThingUid, _endpoint: &dyn ZigBeeEndpoint) -> Option<Channel> {
            Some(Channel {
                uid: ChannelUid::new(thing_uid, "broken"),
                channel_type: ChannelTypeUid::new("zigbee", "broken"),
                item_type: ItemType::Switch,
                label: "Broken".to_string(),
                properties: BTreeMap::new(),
            })
        }

        fn handle_refresh(&self) {}

        fn handle_command(&self, _command: &HostCommand) {}

        fn dispose_converter(&self) {
            BROKEN_DISPOSED.fetch_add(1, Ordering::SeqCst);
        }

        fn state(&self) -> ConverterState {
            ConverterState::Disposed
        }
    }

    fn broken(_context: ConverterContext) -> Arc<dyn ZigBeeChannelConverter> {
        Arc::new(Broken)
    }

    fn create(fixture: &Fixture, registry: &ConverterRegistry) -> Vec<ActiveConverter> {
        registry.create_converters(
            &fixture.thing_uid,
            fixture.endpoint.clone(),
            fixture.context.callback.clone(),
            fixture.context.config.clone(),
        )
    }

    #[test]
    fn test_default_registration_order() {
        let registry = ConverterRegistry::default();
        let types: Vec<_> = registry.channel_types().collect();
        assert_eq!(types, vec!["switch_trigger", "multistate"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ConverterRegistry::default();
        registry.register(CHANNEL_SWITCH_TRIGGER, ZigBeeConverterMultistate::create);
        assert_eq!(registry.channel_types().count(), 2);

        let fixture = Fixture::new();
        let converter = registry
            .create(CHANNEL_SWITCH_TRIGGER, fixture.context.clone())
            .unwrap();
        assert_eq!(converter.channel_type_id(), CHANNEL_MULTISTATE);
        assert!(registry.create("color", fixture.context.clone()).is_none());
    }

    #[test]
    fn test_unsupported_converter_is_never_initialised() {
        let fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let multistate = fixture
            .endpoint
            .add_output_cluster(ZclClusterType::MultistateInputBasic);

        let active = create(&fixture, &ConverterRegistry::default());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].converter.channel_type_id(), CHANNEL_SWITCH_TRIGGER);
        assert_eq!(active[0].converter.state(), ConverterState::Bound);
        assert_eq!(server.attribute_listener_count(), 1);

        // Nothing touched the wrong-role multistate cluster
        assert!(multistate.requests().is_empty());
        assert_eq!(multistate.attribute_listener_count(), 0);
    }

    #[test]
    fn test_channels_in_registration_order() {
        let fixture = Fixture::new();
        fixture
            .endpoint
            .add_input_cluster(ZclClusterType::MultistateInputBasic);
        fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);

        let active = create(&fixture, &ConverterRegistry::default());
        let ids: Vec<_> = active.iter().map(|a| a.channel.uid.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "00124B0012345678_1_switch_trigger",
                "00124B0012345678_1_multistate"
            ]
        );
    }

    #[test]
    fn test_empty_endpoint_yields_nothing() {
        let fixture = Fixture::new();
        fixture.endpoint.add_input_cluster(ZclClusterType::Basic);
        assert!(create(&fixture, &ConverterRegistry::default()).is_empty());
    }

    #[test]
    fn test_failed_initialise_is_disposed_and_dropped() {
        let fixture = Fixture::new();
        fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let mut registry = ConverterRegistry::default();
        registry.register("broken", broken);

        let active = create(&fixture, &registry);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].converter.channel_type_id(), CHANNEL_SWITCH_TRIGGER);
        assert_eq!(BROKEN_DISPOSED.load(Ordering::SeqCst), 1);
    }
}
