//! Identifiers shared between the converters and the host.

/// Thing type of a generic ZigBee device.
pub const THING_TYPE_DEVICE: &str = "device";

// Channel type ids, prefixed with the binding id at runtime
pub const CHANNEL_SWITCH_TRIGGER: &str = "switch_trigger";
pub const CHANNEL_MULTISTATE: &str = "multistate";

pub const CHANNEL_LABEL_SWITCH_TRIGGER: &str = "Trigger";
pub const CHANNEL_LABEL_MULTISTATE: &str = "State";

/// Channel property holding the endpoint number the channel belongs to.
pub const CHANNEL_PROPERTY_ENDPOINT: &str = "zigbee_endpoint";

/// Trigger event payloads
pub const EVENT_ON: &str = "ON";
pub const EVENT_OFF: &str = "OFF";
