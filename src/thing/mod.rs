//! Host runtime boundary: things, channels, item types, commands and states.
//!
//! The host owns the thing/channel registry. This module only carries the
//! values exchanged with it and the callback the converters push state into.

mod callback;
mod types;

pub use callback::{ChannelEvent, ChannelEventSender, ThingHandlerCallback, channel_events};
pub use types::{HostCommand, OnOffType, PercentType, State};

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

/// Identifier of a thing, e.g. `zigbee:device:00124b0012345678`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ThingUid(String);

impl ThingUid {
    pub fn new(binding_id: &str, thing_type: &str, id: &str) -> Self {
        Self(format!("{}:{}:{}", binding_id, thing_type, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThingUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a channel type, e.g. `zigbee:switch_trigger`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChannelTypeUid {
    binding_id: String,
    id: String,
}

impl ChannelTypeUid {
    pub fn new(binding_id: &str, id: &str) -> Self {
        Self {
            binding_id: binding_id.to_string(),
            id: id.to_string(),
        }
    }

    pub fn binding_id(&self) -> &str {
        &self.binding_id
    }

    /// Type id without the binding prefix.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ChannelTypeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.binding_id, self.id)
    }
}

/// Identifier of a channel within a thing.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ChannelUid {
    thing: ThingUid,
    id: String,
}

impl ChannelUid {
    pub fn new(thing: &ThingUid, id: impl Into<String>) -> Self {
        Self {
            thing: thing.clone(),
            id: id.into(),
        }
    }

    pub fn thing_uid(&self) -> &ThingUid {
        &self.thing
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ChannelUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.thing, self.id)
    }
}

macro_rules! serialize_as_string {
    ($($ty:ty),*) => {
        $(impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        })*
    };
}

serialize_as_string!(ThingUid, ChannelTypeUid, ChannelUid);

/// Semantic item type a channel is linked to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, AsRefStr, Serialize)]
pub enum ItemType {
    Color,
    Contact,
    Dimmer,
    Number,
    String,
    Switch,
    Trigger,
}

/// A channel description handed to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Channel {
    pub uid: ChannelUid,
    pub channel_type: ChannelTypeUid,
    pub item_type: ItemType,
    pub label: String,
    pub properties: BTreeMap<String, String>,
}
