//! On/Off cluster (0x0006).
//!
//! Server role: the device hosts the `OnOff` attribute (a relay, a bulb).
//! Client role: the device sends On/Off/Toggle commands (a battery switch
//! with no local load).

use crate::zcl::{ZclAttribute, ZclClusterType, ZclDataType};
use strum::FromRepr;

/// ZCL Cluster ID for On/Off
pub const CLUSTER_ID: u16 = 0x0006;

/// Attribute IDs for the On/Off cluster
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u16)]
pub enum OnOffAttribute {
    /// Current on/off state
    OnOff = 0x0000,
    GlobalSceneControl = 0x4000,
    /// Time (1/10 s) the device stays on after OnWithTimedOff
    OnTime = 0x4001,
    /// Time (1/10 s) the device ignores On commands after switching off
    OffWaitTime = 0x4002,
}

pub const ATTR_ONOFF: u16 = OnOffAttribute::OnOff as u16;
pub const ATTR_GLOBALSCENECONTROL: u16 = OnOffAttribute::GlobalSceneControl as u16;
pub const ATTR_ONTIME: u16 = OnOffAttribute::OnTime as u16;
pub const ATTR_OFFWAITTIME: u16 = OnOffAttribute::OffWaitTime as u16;

pub const CMD_OFF: u8 = 0x00;
pub const CMD_ON: u8 = 0x01;
pub const CMD_TOGGLE: u8 = 0x02;
pub const CMD_OFF_WITH_EFFECT: u8 = 0x40;
pub const CMD_ON_WITH_RECALL_GLOBAL_SCENE: u8 = 0x41;
pub const CMD_ON_WITH_TIMED_OFF: u8 = 0x42;

/// Attribute table for the cluster.
pub fn attributes() -> Vec<ZclAttribute> {
    let t = ZclClusterType::OnOff;
    vec![
        ZclAttribute::new(t, ATTR_ONOFF, "OnOff", ZclDataType::Boolean, false),
        ZclAttribute::new(
            t,
            ATTR_GLOBALSCENECONTROL,
            "GlobalSceneControl",
            ZclDataType::Boolean,
            false,
        ),
        ZclAttribute::new(t, ATTR_ONTIME, "OnTime", ZclDataType::Unsigned16, true),
        ZclAttribute::new(
            t,
            ATTR_OFFWAITTIME,
            "OffWaitTime",
            ZclDataType::Unsigned16,
            true,
        ),
    ]
}
