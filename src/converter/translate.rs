//! Value translation between ZCL encodings and channel values.
//!
//! Every rule is total: each input maps to exactly one channel value or is
//! dropped (`None`). Dropped values are protocol noise and never reach the
//! host.

use crate::thing::{HostCommand, OnOffType};
use crate::zcl::{OnOffCommand, ZclValue};

/// Boolean-like attribute value to on/off.
///
/// `Boolean` maps directly; the enumeration codes 0 and 1 map to off and on.
/// Reserved codes and every other variant are dropped.
pub fn on_off_from_value(value: &ZclValue) -> Option<OnOffType> {
    match value {
        ZclValue::Boolean(b) => Some(OnOffType::from(*b)),
        ZclValue::Unsigned(0) => Some(OnOffType::Off),
        ZclValue::Unsigned(1) => Some(OnOffType::On),
        ZclValue::Unsigned(_)
        | ZclValue::Signed(_)
        | ZclValue::CharString(_)
        | ZclValue::StringArray(_) => None,
    }
}

/// Host command to on/off, for switch-like channels.
///
/// Percent commands follow the threshold policy: zero is off, any other
/// value is on. Other commands carry no on/off meaning and are ignored.
pub fn on_off_from_command(command: &HostCommand) -> Option<OnOffType> {
    match command {
        HostCommand::OnOff(on_off) => Some(*on_off),
        HostCommand::Percent(percent) => Some(if percent.value() == 0 {
            OnOffType::Off
        } else {
            OnOffType::On
        }),
        HostCommand::Decimal(_)
        | HostCommand::String(_)
        | HostCommand::Increase
        | HostCommand::Decrease
        | HostCommand::Refresh => None,
    }
}

/// Device-issued On/Off command to the resulting state.
///
/// `Toggle` needs the last known state; without one it is dropped.
pub fn on_off_from_device_command(
    command: &OnOffCommand,
    last_known: Option<OnOffType>,
) -> Option<OnOffType> {
    match command {
        OnOffCommand::On
        | OnOffCommand::OnWithRecallGlobalScene
        | OnOffCommand::OnWithTimedOff { .. } => Some(OnOffType::On),
        OnOffCommand::Off | OnOffCommand::OffWithEffect { .. } => Some(OnOffType::Off),
        OnOffCommand::Toggle => last_known.map(|s| s.inverse()),
    }
}

/// On/off to the command a server cluster understands.
pub fn on_off_to_device_command(on_off: OnOffType) -> OnOffCommand {
    match on_off {
        OnOffType::On => OnOffCommand::On,
        OnOffType::Off => OnOffCommand::Off,
    }
}

/// Text for a multistate present value.
///
/// `present_value` is 1-based. Zero and values beyond `number_of_states`
/// (when known) are dropped. The state text is used when the device
/// provided one for this index, otherwise the index itself.
pub fn multistate_label(
    present_value: u32,
    number_of_states: Option<u32>,
    state_text: &[String],
) -> Option<String> {
    if present_value == 0 {
        return None;
    }
    if let Some(count) = number_of_states
        && present_value > count
    {
        return None;
    }
    let text = usize::try_from(present_value - 1)
        .ok()
        .and_then(|index| state_text.get(index))
        .filter(|text| !text.is_empty());
    match text {
        Some(text) => Some(text.clone()),
        None => Some(present_value.to_string()),
    }
}
