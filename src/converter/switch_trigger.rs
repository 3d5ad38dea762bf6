//! Switch trigger converter (`switch_trigger`, item type Trigger).
//!
//! Supports changes through attribute reports and through received commands.
//! A switch that is not connected to a load sends On/Off commands from its
//! client cluster; a switch connected to a load reports its `OnOff`
//! attribute from its server cluster. Either or both may be present.

use super::translate;
use super::{
    ClusterBinding, ConverterBase, ConverterContext, ConverterState, ZigBeeChannelConverter,
};
use crate::constants::{CHANNEL_LABEL_SWITCH_TRIGGER, CHANNEL_SWITCH_TRIGGER, EVENT_OFF, EVENT_ON};
use crate::error::ConverterError;
use crate::thing::{Channel, HostCommand, ItemType, OnOffType, State, ThingUid};
use crate::zcl::clusters::on_off;
use crate::zcl::{
    OnOffCommand, ZclAttribute, ZclAttributeListener, ZclClusterType, ZclCommand,
    ZclCommandListener, ZigBeeEndpoint,
};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct ZigBeeConverterSwitchTrigger {
    base: ConverterBase,
    /// Last on/off state seen from the device, shared by both listener paths.
    last_state: Mutex<Option<OnOffType>>,
}

impl ZigBeeConverterSwitchTrigger {
    pub fn new(context: ConverterContext) -> Self {
        Self {
            base: ConverterBase::new(context, CHANNEL_SWITCH_TRIGGER),
            last_state: Mutex::new(None),
        }
    }

    /// Factory for the converter registry.
    pub fn create(context: ConverterContext) -> Arc<dyn ZigBeeChannelConverter> {
        Arc::new(Self::new(context))
    }
}

impl ZigBeeChannelConverter for ZigBeeConverterSwitchTrigger {
    fn channel_type_id(&self) -> &'static str {
        CHANNEL_SWITCH_TRIGGER
    }

    fn initialize_converter(self: Arc<Self>, channel: &Channel) -> Result<(), ConverterError> {
        let attribute_listener: Arc<dyn ZclAttributeListener> = self.clone();
        let command_listener: Arc<dyn ZclCommandListener> = self.clone();
        let binding = self.base.open(
            channel,
            on_off::CLUSTER_ID,
            on_off::CLUSTER_ID,
            attribute_listener,
            command_listener,
        )?;

        if self.base.config().read_on_initialize {
            binding.read_attributes(&[on_off::ATTR_ONOFF]);
        }
        Ok(())
    }

    fn channel(&self, thing_uid: &ThingUid, endpoint: &dyn ZigBeeEndpoint) -> Option<Channel> {
        if !ClusterBinding::is_present(endpoint, on_off::CLUSTER_ID, on_off::CLUSTER_ID) {
            return None;
        }
        Some(self.base.create_channel(
            thing_uid,
            endpoint,
            ItemType::Trigger,
            CHANNEL_LABEL_SWITCH_TRIGGER,
        ))
    }

    fn handle_refresh(&self) {
        if !self.base.is_bound() {
            return;
        }
        if let Some(binding) = self.base.binding() {
            binding.read_attributes(&[on_off::ATTR_ONOFF]);
        }
    }

    fn handle_command(&self, command: &HostCommand) {
        if let HostCommand::Refresh = command {
            self.handle_refresh();
            return;
        }

        let Some(server) = self.base.server_cluster() else {
            // Trigger only: nothing on the device accepts commands
            debug!(
                "{}: No on/off server cluster, ignoring {:?}",
                self.base.ieee(),
                command
            );
            return;
        };
        let Some(on_off) = translate::on_off_from_command(command) else {
            debug!("{}: Ignoring command {:?}", self.base.ieee(), command);
            return;
        };

        let zcl_command = ZclCommand::OnOff(translate::on_off_to_device_command(on_off));
        if let Err(e) = server.send_command(zcl_command) {
            warn!(
                "{}: Failed to send {} to on/off cluster: {}",
                self.base.ieee(),
                zcl_command,
                e
            );
        }
    }

    fn dispose_converter(&self) {
        self.base.dispose();
    }

    fn state(&self) -> ConverterState {
        self.base.state()
    }
}

impl ZclAttributeListener for ZigBeeConverterSwitchTrigger {
    fn attribute_updated(&self, attribute: &ZclAttribute) {
        debug!("{}: ZigBee attribute reports {}", self.base.ieee(), attribute);
        if !self.base.is_active() {
            return;
        }
        if attribute.cluster() != ZclClusterType::OnOff || attribute.id() != on_off::ATTR_ONOFF {
            return;
        }
        let Some(state) = attribute.last_value().and_then(translate::on_off_from_value) else {
            debug!(
                "{}: Dropping on/off report without a valid value",
                self.base.ieee()
            );
            return;
        };

        // Held across the push so the host sees states in the order they were applied
        let mut last_state = self.last_state.lock();
        *last_state = Some(state);
        self.base.trigger_channel(match state {
            OnOffType::On => EVENT_ON,
            OnOffType::Off => EVENT_OFF,
        });
    }
}

impl ZclCommandListener for ZigBeeConverterSwitchTrigger {
    fn command_received(&self, command: &ZclCommand) {
        debug!("{}: ZigBee command received {}", self.base.ieee(), command);
        if !self.base.is_active() {
            return;
        }
        match command {
            ZclCommand::OnOff(cmd) => {
                let mut last_state = self.last_state.lock();
                match translate::on_off_from_device_command(cmd, *last_state) {
                    Some(state) => {
                        *last_state = Some(state);
                        self.base.update_channel_state(State::OnOff(state));
                    }
                    None => debug!(
                        "{}: {:?} without a known state, dropped",
                        self.base.ieee(),
                        cmd
                    ),
                }
            }
            ZclCommand::Other { .. } => {
                debug!("{}: Ignoring command {}", self.base.ieee(), command);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindingConfig;
    use crate::converter::fixtures::{Fixture, SlowHost};
    use crate::thing::{ChannelEvent, PercentType};
    use crate::zcl::{ZclCluster, ZclValue};
    use std::thread;

    fn converter(fixture: &Fixture) -> Arc<ZigBeeConverterSwitchTrigger> {
        Arc::new(ZigBeeConverterSwitchTrigger::new(fixture.context.clone()))
    }

    fn open(fixture: &Fixture) -> (Arc<ZigBeeConverterSwitchTrigger>, Channel) {
        let converter = converter(fixture);
        let channel = converter
            .channel(&fixture.thing_uid, fixture.endpoint.as_ref())
            .unwrap();
        converter.clone().initialize_converter(&channel).unwrap();
        (converter, channel)
    }

    #[test]
    fn test_no_cluster_no_channel() {
        let fixture = Fixture::new();
        let converter = converter(&fixture);
        assert!(
            converter
                .channel(&fixture.thing_uid, fixture.endpoint.as_ref())
                .is_none()
        );

        let channel = converter.base.create_channel(
            &fixture.thing_uid,
            fixture.endpoint.as_ref(),
            ItemType::Trigger,
            "Trigger",
        );
        let result = converter.clone().initialize_converter(&channel);
        assert!(matches!(result, Err(ConverterError::ClusterUnavailable { .. })));
        assert_eq!(converter.state(), ConverterState::Disposed);

        converter.dispose_converter();
        assert_eq!(converter.state(), ConverterState::Disposed);
    }

    #[test]
    fn test_channel_description() {
        let fixture = Fixture::new();
        fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let channel = converter(&fixture)
            .channel(&fixture.thing_uid, fixture.endpoint.as_ref())
            .unwrap();
        assert_eq!(channel.channel_type.to_string(), "zigbee:switch_trigger");
        assert_eq!(channel.item_type, ItemType::Trigger);
        assert_eq!(channel.label, "Trigger");
        assert_eq!(channel.uid.id(), "00124B0012345678_1_switch_trigger");
        assert_eq!(channel.properties.get("zigbee_endpoint").unwrap(), "1");
    }

    #[test]
    fn test_input_only_report_fires_trigger() {
        let mut fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, channel) = open(&fixture);

        assert_eq!(converter.state(), ConverterState::Bound);
        assert_eq!(server.bind_count(), 1);
        assert_eq!(server.read_requests(), vec![on_off::ATTR_ONOFF]);

        server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Boolean(true));
        assert_eq!(
            fixture.drain(),
            vec![ChannelEvent::Triggered {
                channel: channel.uid.clone(),
                event: "ON".to_string()
            }]
        );
    }

    #[test]
    fn test_output_only_command_updates_state() {
        let mut fixture = Fixture::new();
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let (converter, channel) = open(&fixture);

        client.receive_command(ZclCommand::OnOff(OnOffCommand::Off));
        assert_eq!(
            fixture.drain(),
            vec![ChannelEvent::StateUpdated {
                channel: channel.uid.clone(),
                state: State::OnOff(OnOffType::Off)
            }]
        );

        // No server cluster: nothing to read and nothing to command
        converter.handle_refresh();
        converter.handle_command(&HostCommand::OnOff(OnOffType::On));
        assert!(client.read_requests().is_empty());
        assert!(client.sent_commands().is_empty());
        assert!(fixture.drain().is_empty());
    }

    #[test]
    fn test_one_registration_per_cluster_and_dispose_is_idempotent() {
        let fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);

        for cluster in [&server, &client] {
            assert_eq!(cluster.attribute_listener_count(), 1);
            assert_eq!(cluster.command_listener_count(), 1);
        }

        converter.dispose_converter();
        converter.dispose_converter();
        assert_eq!(converter.state(), ConverterState::Disposed);
        for cluster in [&server, &client] {
            assert_eq!(cluster.attribute_listener_count(), 0);
            assert_eq!(cluster.command_listener_count(), 0);
        }
    }

    #[test]
    fn test_percent_threshold_sends_on_off() {
        let fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);

        converter.handle_command(&HostCommand::Percent(PercentType::ZERO));
        converter.handle_command(&HostCommand::Percent(PercentType::new(60).unwrap()));
        converter.handle_command(&HostCommand::OnOff(OnOffType::Off));
        converter.handle_command(&HostCommand::String("ON".to_string()));
        converter.handle_command(&HostCommand::Increase);

        assert_eq!(
            server.sent_commands(),
            vec![
                ZclCommand::OnOff(OnOffCommand::Off),
                ZclCommand::OnOff(OnOffCommand::On),
                ZclCommand::OnOff(OnOffCommand::Off),
            ]
        );
    }

    #[test]
    fn test_refresh_command_reads_on_off() {
        let fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);
        server.clear_requests();

        converter.handle_command(&HostCommand::Refresh);
        assert_eq!(server.read_requests(), vec![on_off::ATTR_ONOFF]);
        assert!(server.sent_commands().is_empty());
    }

    #[test]
    fn test_irrelevant_and_invalid_reports_are_dropped() {
        let mut fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (_converter, _) = open(&fixture);

        server.report_attribute(on_off::ATTR_ONTIME, ZclValue::Unsigned(30));
        server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Unsigned(7));
        assert!(fixture.drain().is_empty());

        server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Unsigned(0));
        assert_eq!(fixture.drain().len(), 1);
    }

    #[test]
    fn test_toggle_uses_last_known_state() {
        let mut fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let (_converter, channel) = open(&fixture);

        client.receive_command(ZclCommand::OnOff(OnOffCommand::Toggle));
        assert!(fixture.drain().is_empty());

        server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Boolean(true));
        client.receive_command(ZclCommand::OnOff(OnOffCommand::Toggle));
        let events = fixture.drain();
        assert_eq!(
            events.last(),
            Some(&ChannelEvent::StateUpdated {
                channel: channel.uid.clone(),
                state: State::OnOff(OnOffType::Off)
            })
        );
    }

    #[test]
    fn test_unknown_commands_are_ignored() {
        let mut fixture = Fixture::new();
        fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);

        converter.command_received(&ZclCommand::Other {
            cluster_id: on_off::CLUSTER_ID,
            command_id: 0x7F,
        });
        assert!(fixture.drain().is_empty());
    }

    #[test]
    fn test_disposed_converter_ignores_late_events() {
        let mut fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);
        converter.dispose_converter();

        assert_eq!(
            server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Boolean(true)),
            0
        );
        // An event that raced past listener removal
        let attribute = server.attribute(on_off::ATTR_ONOFF).unwrap();
        converter.attribute_updated(&attribute);
        converter.command_received(&ZclCommand::OnOff(OnOffCommand::On));
        converter.handle_command(&HostCommand::OnOff(OnOffType::On));
        assert!(fixture.drain().is_empty());
        assert!(server.sent_commands().is_empty());
    }

    #[test]
    fn test_initialize_twice_is_rejected() {
        let fixture = Fixture::new();
        fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, channel) = open(&fixture);
        let result = converter.clone().initialize_converter(&channel);
        assert!(matches!(
            result,
            Err(ConverterError::InvalidState {
                actual: ConverterState::Bound,
                ..
            })
        ));
    }

    #[test]
    fn test_bind_and_read_can_be_disabled() {
        let config = BindingConfig {
            bind_clusters: false,
            read_on_initialize: false,
            ..BindingConfig::default()
        };
        let fixture = Fixture::with_config(config);
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);

        assert_eq!(converter.state(), ConverterState::Bound);
        assert!(server.requests().is_empty());
        assert_eq!(server.attribute_listener_count(), 1);
    }

    #[test]
    fn test_bind_failure_still_initializes() {
        let mut fixture = Fixture::new();
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        client.fail_binds("not supported");
        let (converter, _) = open(&fixture);

        assert_eq!(converter.state(), ConverterState::Bound);
        client.receive_command(ZclCommand::OnOff(OnOffCommand::On));
        assert_eq!(fixture.drain().len(), 1);
    }

    #[test]
    fn test_concurrent_delivery_and_dispose() {
        let fixture = Fixture::new();
        let server = fixture.endpoint.add_input_cluster(ZclClusterType::OnOff);
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let (converter, _) = open(&fixture);

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..500 {
                    server.report_attribute(on_off::ATTR_ONOFF, ZclValue::Boolean(i % 2 == 0));
                }
            });
            s.spawn(|| {
                for _ in 0..500 {
                    client.receive_command(ZclCommand::OnOff(OnOffCommand::Toggle));
                }
            });
            s.spawn(|| {
                for i in 0..500u32 {
                    let percent = PercentType::new((i % 101) as u8).unwrap();
                    converter.handle_command(&HostCommand::Percent(percent));
                }
            });
            s.spawn(|| {
                thread::yield_now();
                converter.dispose_converter();
            });
        });

        assert_eq!(converter.state(), ConverterState::Disposed);
        for cluster in [&server, &client] {
            assert_eq!(cluster.attribute_listener_count(), 0);
            assert_eq!(cluster.command_listener_count(), 0);
        }
    }

    #[test]
    fn test_toggle_during_slow_publish_keeps_order() {
        let fixture = Fixture::new();
        let client = fixture.endpoint.add_output_cluster(ZclClusterType::OnOff);
        let host = SlowHost::new("ON");
        let converter = Arc::new(ZigBeeConverterSwitchTrigger::new(
            fixture.context_with(host.clone()),
        ));
        let channel = converter
            .channel(&fixture.thing_uid, fixture.endpoint.as_ref())
            .unwrap();
        converter.clone().initialize_converter(&channel).unwrap();

        thread::scope(|s| {
            s.spawn(|| {
                client.receive_command(ZclCommand::OnOff(OnOffCommand::On));
            });
            s.spawn(|| {
                host.wait_for_stall();
                client.receive_command(ZclCommand::OnOff(OnOffCommand::Toggle));
            });
        });

        assert_eq!(host.published(), vec!["ON", "OFF"]);
        assert_eq!(*converter.last_state.lock(), Some(OnOffType::Off));
    }
}
