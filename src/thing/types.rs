//! Command and state values exchanged with the host.

use serde::Serialize;
use std::fmt;
use strum::Display;

/// Binary switch value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OnOffType {
    On,
    Off,
}

impl OnOffType {
    pub fn inverse(&self) -> Self {
        match self {
            OnOffType::On => OnOffType::Off,
            OnOffType::Off => OnOffType::On,
        }
    }
}

impl From<bool> for OnOffType {
    fn from(on: bool) -> Self {
        if on { OnOffType::On } else { OnOffType::Off }
    }
}

/// Percentage in `0..=100`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub struct PercentType(u8);

impl PercentType {
    pub const ZERO: PercentType = PercentType(0);
    pub const HUNDRED: PercentType = PercentType(100);

    /// Returns `None` for values above 100.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(PercentType(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PercentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Command issued by the host against a channel.
///
/// The host has already typed it to what the channel's item type accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    OnOff(OnOffType),
    Percent(PercentType),
    Decimal(f64),
    String(String),
    Increase,
    Decrease,
    Refresh,
}

/// Channel state pushed to the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum State {
    OnOff(OnOffType),
    Percent(PercentType),
    Decimal(f64),
    String(String),
    Undef,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::OnOff(v) => write!(f, "{}", v),
            State::Percent(v) => write!(f, "{}", v),
            State::Decimal(v) => write!(f, "{}", v),
            State::String(v) => write!(f, "{}", v),
            State::Undef => write!(f, "UNDEF"),
        }
    }
}
