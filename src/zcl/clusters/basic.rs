//! Basic cluster (0x0000). Only the identification attributes are modelled.

use crate::zcl::{ZclAttribute, ZclClusterType, ZclDataType};

pub const CLUSTER_ID: u16 = 0x0000;

pub const ATTR_ZCLVERSION: u16 = 0x0000;
pub const ATTR_MANUFACTURERNAME: u16 = 0x0004;
pub const ATTR_MODELIDENTIFIER: u16 = 0x0005;
pub const ATTR_POWERSOURCE: u16 = 0x0007;

pub fn attributes() -> Vec<ZclAttribute> {
    let t = ZclClusterType::Basic;
    vec![
        ZclAttribute::new(
            t,
            ATTR_ZCLVERSION,
            "ZCLVersion",
            ZclDataType::Unsigned8,
            false,
        ),
        ZclAttribute::new(
            t,
            ATTR_MANUFACTURERNAME,
            "ManufacturerName",
            ZclDataType::CharacterString,
            false,
        ),
        ZclAttribute::new(
            t,
            ATTR_MODELIDENTIFIER,
            "ModelIdentifier",
            ZclDataType::CharacterString,
            false,
        ),
        ZclAttribute::new(
            t,
            ATTR_POWERSOURCE,
            "PowerSource",
            ZclDataType::Enumeration8,
            false,
        ),
    ]
}
