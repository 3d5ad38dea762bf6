//! ZCL attribute model.
//!
//! An attribute is a typed value slot inside a cluster. The protocol stack
//! updates the last value whenever a report or read response arrives, then
//! hands a copy of the attribute to every registered attribute listener.

use super::ZclClusterType;
use std::fmt;

/// ZCL data types used by the clusters this bridge understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ZclDataType {
    Boolean,
    Bitmap8,
    Enumeration8,
    Enumeration16,
    Unsigned8,
    Unsigned16,
    Unsigned32,
    Signed16,
    CharacterString,
    ArrayCharacterString,
}

impl ZclDataType {
    /// Whether a value variant can be stored in an attribute of this type.
    pub fn accepts(&self, value: &ZclValue) -> bool {
        match (self, value) {
            (ZclDataType::Boolean, ZclValue::Boolean(_)) => true,
            (
                ZclDataType::Bitmap8 | ZclDataType::Enumeration8 | ZclDataType::Unsigned8,
                ZclValue::Unsigned(v),
            ) => *v <= u8::MAX as u32,
            (ZclDataType::Enumeration16 | ZclDataType::Unsigned16, ZclValue::Unsigned(v)) => {
                *v <= u16::MAX as u32
            }
            (ZclDataType::Unsigned32, ZclValue::Unsigned(_)) => true,
            (ZclDataType::Signed16, ZclValue::Signed(v)) => {
                (i16::MIN as i32..=i16::MAX as i32).contains(v)
            }
            (ZclDataType::CharacterString, ZclValue::CharString(_)) => true,
            (ZclDataType::ArrayCharacterString, ZclValue::StringArray(_)) => true,
            _ => false,
        }
    }
}

/// Protocol-native attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum ZclValue {
    Boolean(bool),
    /// Unsigned integers, enumerations and bitmaps.
    Unsigned(u32),
    Signed(i32),
    CharString(String),
    StringArray(Vec<String>),
}

impl ZclValue {
    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            ZclValue::Unsigned(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ZclValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZclValue::Boolean(b) => write!(f, "{}", b),
            ZclValue::Unsigned(v) => write!(f, "{}", v),
            ZclValue::Signed(v) => write!(f, "{}", v),
            ZclValue::CharString(s) => write!(f, "\"{}\"", s),
            ZclValue::StringArray(items) => write!(f, "{:?}", items),
        }
    }
}

/// A typed, identified value slot within a cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ZclAttribute {
    cluster: ZclClusterType,
    id: u16,
    name: &'static str,
    data_type: ZclDataType,
    writable: bool,
    last_value: Option<ZclValue>,
}

impl ZclAttribute {
    pub fn new(
        cluster: ZclClusterType,
        id: u16,
        name: &'static str,
        data_type: ZclDataType,
        writable: bool,
    ) -> Self {
        Self {
            cluster,
            id,
            name,
            data_type,
            writable,
            last_value: None,
        }
    }

    pub fn cluster(&self) -> ZclClusterType {
        self.cluster
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn data_type(&self) -> ZclDataType {
        self.data_type
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Last value received from the device, if any report arrived yet.
    pub fn last_value(&self) -> Option<&ZclValue> {
        self.last_value.as_ref()
    }

    /// Store a newly reported value.
    ///
    /// Values that do not fit the attribute's data type are still stored:
    /// devices do send malformed payloads and the converters are the ones
    /// deciding what to drop.
    pub fn update_value(&mut self, value: ZclValue) {
        self.last_value = Some(value);
    }
}

impl fmt::Display for ZclAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ZclAttribute [cluster={}, id=0x{:04X}, name={}, type={:?}, value=",
            self.cluster, self.id, self.name, self.data_type
        )?;
        match &self.last_value {
            Some(value) => write!(f, "{}]", value),
            None => write!(f, "null]"),
        }
    }
}
