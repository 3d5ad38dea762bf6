//! Multistate Input (Basic) 0x0012 and Multistate Output (Basic) 0x0013.
//!
//! Both clusters share their attribute layout: `PresentValue` is a 1-based
//! index into `StateText`, bounded by `NumberOfStates`.

use crate::zcl::{ZclAttribute, ZclClusterType, ZclDataType};
use strum::FromRepr;

pub const INPUT_CLUSTER_ID: u16 = 0x0012;
pub const OUTPUT_CLUSTER_ID: u16 = 0x0013;

/// Attribute IDs shared by the multistate clusters
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromRepr)]
#[repr(u16)]
pub enum MultistateAttribute {
    StateText = 0x000E,
    Description = 0x001C,
    NumberOfStates = 0x004A,
    OutOfService = 0x0051,
    PresentValue = 0x0055,
    Reliability = 0x0067,
    /// Output cluster only
    RelinquishDefault = 0x0068,
    StatusFlags = 0x006F,
    ApplicationType = 0x0100,
}

pub const ATTR_STATETEXT: u16 = MultistateAttribute::StateText as u16;
pub const ATTR_DESCRIPTION: u16 = MultistateAttribute::Description as u16;
pub const ATTR_NUMBEROFSTATES: u16 = MultistateAttribute::NumberOfStates as u16;
pub const ATTR_OUTOFSERVICE: u16 = MultistateAttribute::OutOfService as u16;
pub const ATTR_PRESENTVALUE: u16 = MultistateAttribute::PresentValue as u16;
pub const ATTR_RELIABILITY: u16 = MultistateAttribute::Reliability as u16;
pub const ATTR_RELINQUISHDEFAULT: u16 = MultistateAttribute::RelinquishDefault as u16;
pub const ATTR_STATUSFLAGS: u16 = MultistateAttribute::StatusFlags as u16;
pub const ATTR_APPLICATIONTYPE: u16 = MultistateAttribute::ApplicationType as u16;

/// Attribute table for either multistate cluster.
pub fn attributes(cluster: ZclClusterType) -> Vec<ZclAttribute> {
    let output = cluster == ZclClusterType::MultistateOutputBasic;
    let mut attrs = vec![
        ZclAttribute::new(
            cluster,
            ATTR_STATETEXT,
            "StateText",
            ZclDataType::ArrayCharacterString,
            true,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_DESCRIPTION,
            "Description",
            ZclDataType::CharacterString,
            true,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_NUMBEROFSTATES,
            "NumberOfStates",
            ZclDataType::Unsigned16,
            false,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_OUTOFSERVICE,
            "OutOfService",
            ZclDataType::Boolean,
            true,
        ),
        // Writable on the output cluster only.
        ZclAttribute::new(
            cluster,
            ATTR_PRESENTVALUE,
            "PresentValue",
            ZclDataType::Unsigned16,
            output,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_RELIABILITY,
            "Reliability",
            ZclDataType::Enumeration8,
            true,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_STATUSFLAGS,
            "StatusFlags",
            ZclDataType::Bitmap8,
            false,
        ),
        ZclAttribute::new(
            cluster,
            ATTR_APPLICATIONTYPE,
            "ApplicationType",
            ZclDataType::Unsigned32,
            false,
        ),
    ];
    if output {
        attrs.push(ZclAttribute::new(
            cluster,
            ATTR_RELINQUISHDEFAULT,
            "RelinquishDefault",
            ZclDataType::Unsigned16,
            true,
        ));
    }
    attrs
}
