//! Multistate converter (`multistate`, item type String).
//!
//! Publishes the state text of a Multistate Input (Basic) server cluster, or
//! of the Multistate Output (Basic) client cluster of a device driving one.

use super::translate;
use super::{
    ClusterBinding, ConverterBase, ConverterContext, ConverterState, ZigBeeChannelConverter,
};
use crate::constants::{CHANNEL_LABEL_MULTISTATE, CHANNEL_MULTISTATE};
use crate::error::ConverterError;
use crate::thing::{Channel, HostCommand, ItemType, State, ThingUid};
use crate::zcl::clusters::multistate;
use crate::zcl::{
    ZclAttribute, ZclAttributeListener, ZclClusterType, ZclCommand, ZclCommandListener, ZclValue,
    ZigBeeEndpoint,
};
use log::{debug, trace};
use parking_lot::Mutex;
use std::sync::Arc;

const INITIAL_READS: [u16; 5] = [
    multistate::ATTR_APPLICATIONTYPE,
    multistate::ATTR_DESCRIPTION,
    multistate::ATTR_NUMBEROFSTATES,
    multistate::ATTR_PRESENTVALUE,
    multistate::ATTR_STATETEXT,
];

const REFRESH_READS: [u16; 2] = [multistate::ATTR_PRESENTVALUE, multistate::ATTR_STATETEXT];

/// What the device told us so far.
#[derive(Debug, Default)]
struct Snapshot {
    state_text: Vec<String>,
    number_of_states: Option<u32>,
    present_value: Option<u32>,
}

impl Snapshot {
    fn label(&self) -> Option<String> {
        self.present_value
            .and_then(|v| translate::multistate_label(v, self.number_of_states, &self.state_text))
    }
}

pub struct ZigBeeConverterMultistate {
    base: ConverterBase,
    snapshot: Mutex<Snapshot>,
}

impl ZigBeeConverterMultistate {
    pub fn new(context: ConverterContext) -> Self {
        Self {
            base: ConverterBase::new(context, CHANNEL_MULTISTATE),
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    /// Factory for the converter registry.
    pub fn create(context: ConverterContext) -> Arc<dyn ZigBeeChannelConverter> {
        Arc::new(Self::new(context))
    }

    fn on_state_text(&self, snapshot: &mut Snapshot, value: &ZclValue) -> Option<String> {
        match value {
            ZclValue::StringArray(texts) => {
                snapshot.state_text = texts.clone();
                snapshot.label()
            }
            ZclValue::CharString(text) => Some(text.clone()),
            other => {
                debug!("{}: Unexpected StateText value {}", self.base.ieee(), other);
                None
            }
        }
    }

    fn on_number_of_states(snapshot: &mut Snapshot, value: &ZclValue) -> Option<String> {
        let count = value.as_unsigned()?;
        snapshot.number_of_states = Some(count);
        // A shrunk range can invalidate the current value
        if let Some(present) = snapshot.present_value
            && present > count
        {
            snapshot.present_value = None;
        }
        None
    }

    fn on_present_value(&self, snapshot: &mut Snapshot, value: &ZclValue) -> Option<String> {
        let Some(present) = value.as_unsigned() else {
            debug!("{}: Unexpected PresentValue {}", self.base.ieee(), value);
            return None;
        };
        let label =
            translate::multistate_label(present, snapshot.number_of_states, &snapshot.state_text);
        match label {
            Some(_) => snapshot.present_value = Some(present),
            None => debug!(
                "{}: Dropping PresentValue {} outside 1..={:?}",
                self.base.ieee(),
                present,
                snapshot.number_of_states
            ),
        }
        label
    }
}

impl ZigBeeChannelConverter for ZigBeeConverterMultistate {
    fn channel_type_id(&self) -> &'static str {
        CHANNEL_MULTISTATE
    }

    fn initialize_converter(self: Arc<Self>, channel: &Channel) -> Result<(), ConverterError> {
        let attribute_listener: Arc<dyn ZclAttributeListener> = self.clone();
        let command_listener: Arc<dyn ZclCommandListener> = self.clone();
        let binding = self.base.open(
            channel,
            multistate::INPUT_CLUSTER_ID,
            multistate::OUTPUT_CLUSTER_ID,
            attribute_listener,
            command_listener,
        )?;

        if self.base.config().read_on_initialize {
            binding.read_attributes(&INITIAL_READS);
        }
        Ok(())
    }

    fn channel(&self, thing_uid: &ThingUid, endpoint: &dyn ZigBeeEndpoint) -> Option<Channel> {
        if !ClusterBinding::is_present(
            endpoint,
            multistate::INPUT_CLUSTER_ID,
            multistate::OUTPUT_CLUSTER_ID,
        ) {
            return None;
        }
        Some(self.base.create_channel(
            thing_uid,
            endpoint,
            ItemType::String,
            CHANNEL_LABEL_MULTISTATE,
        ))
    }

    fn handle_refresh(&self) {
        if !self.base.is_bound() {
            return;
        }
        if let Some(binding) = self.base.binding() {
            binding.read_attributes(&REFRESH_READS);
        }
    }

    fn handle_command(&self, command: &HostCommand) {
        match command {
            HostCommand::Refresh => self.handle_refresh(),
            other => debug!(
                "{}: Multistate channel is read-only, ignoring {:?}",
                self.base.ieee(),
                other
            ),
        }
    }

    fn dispose_converter(&self) {
        self.base.dispose();
    }

    fn state(&self) -> ConverterState {
        self.base.state()
    }
}

impl ZclAttributeListener for ZigBeeConverterMultistate {
    fn attribute_updated(&self, attribute: &ZclAttribute) {
        debug!("{}: ZigBee attribute reports {}", self.base.ieee(), attribute);
        if !self.base.is_active() {
            return;
        }
        if !matches!(
            attribute.cluster(),
            ZclClusterType::MultistateInputBasic | ZclClusterType::MultistateOutputBasic
        ) {
            return;
        }
        let Some(value) = attribute.last_value() else {
            return;
        };

        if matches!(
            attribute.id(),
            multistate::ATTR_DESCRIPTION | multistate::ATTR_APPLICATIONTYPE
        ) {
            debug!("{}: {} is {}", self.base.ieee(), attribute.name(), value);
            return;
        }

        // Published under the lock so the host sees labels in snapshot order
        let mut snapshot = self.snapshot.lock();
        let label = match attribute.id() {
            multistate::ATTR_STATETEXT => self.on_state_text(&mut snapshot, value),
            multistate::ATTR_NUMBEROFSTATES => Self::on_number_of_states(&mut snapshot, value),
            multistate::ATTR_PRESENTVALUE => self.on_present_value(&mut snapshot, value),
            _ => None,
        };
        if let Some(label) = label {
            self.base.update_channel_state(State::String(label));
        }
    }
}

impl ZclCommandListener for ZigBeeConverterMultistate {
    fn command_received(&self, command: &ZclCommand) {
        trace!("{}: Ignoring multistate command {}", self.base.ieee(), command);
    }
}
