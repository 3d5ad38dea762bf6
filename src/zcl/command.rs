//! Device-issued ZCL commands.
//!
//! Commands are delivered once per occurrence and carry no persisted state.
//! The set is closed per cluster domain; anything the bridge does not model
//! arrives as [`ZclCommand::Other`].

use super::clusters::on_off;
use std::fmt;

/// On/Off cluster (0x0006) commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OnOffCommand {
    Off,
    On,
    Toggle,
    OffWithEffect {
        effect_id: u8,
        effect_variant: u8,
    },
    OnWithRecallGlobalScene,
    OnWithTimedOff {
        on_off_control: u8,
        on_time: u16,
        off_wait_time: u16,
    },
}

impl OnOffCommand {
    /// ZCL command identifier.
    pub fn command_id(&self) -> u8 {
        match self {
            OnOffCommand::Off => on_off::CMD_OFF,
            OnOffCommand::On => on_off::CMD_ON,
            OnOffCommand::Toggle => on_off::CMD_TOGGLE,
            OnOffCommand::OffWithEffect { .. } => on_off::CMD_OFF_WITH_EFFECT,
            OnOffCommand::OnWithRecallGlobalScene => on_off::CMD_ON_WITH_RECALL_GLOBAL_SCENE,
            OnOffCommand::OnWithTimedOff { .. } => on_off::CMD_ON_WITH_TIMED_OFF,
        }
    }
}

/// A command received from (or sent to) a cluster.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ZclCommand {
    OnOff(OnOffCommand),
    /// Any command of a cluster domain without a typed model.
    Other { cluster_id: u16, command_id: u8 },
}

impl ZclCommand {
    pub fn cluster_id(&self) -> u16 {
        match self {
            ZclCommand::OnOff(_) => on_off::CLUSTER_ID,
            ZclCommand::Other { cluster_id, .. } => *cluster_id,
        }
    }

    pub fn command_id(&self) -> u8 {
        match self {
            ZclCommand::OnOff(cmd) => cmd.command_id(),
            ZclCommand::Other { command_id, .. } => *command_id,
        }
    }
}

impl fmt::Display for ZclCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZclCommand::OnOff(cmd) => write!(f, "OnOff::{:?}", cmd),
            ZclCommand::Other {
                cluster_id,
                command_id,
            } => write!(
                f,
                "Command [cluster=0x{:04X}, id=0x{:02X}]",
                cluster_id, command_id
            ),
        }
    }
}
