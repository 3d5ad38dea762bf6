//! ZCL cluster definitions: identifiers, attribute IDs, command IDs and the
//! attribute table each cluster carries.

pub mod basic;
pub mod multistate;
pub mod on_off;

use super::{ZclAttribute, ZclClusterType};

/// Default attribute table for a cluster type.
pub fn attribute_table(cluster: ZclClusterType) -> Vec<ZclAttribute> {
    match cluster {
        ZclClusterType::Basic => basic::attributes(),
        ZclClusterType::OnOff => on_off::attributes(),
        ZclClusterType::MultistateInputBasic | ZclClusterType::MultistateOutputBasic => {
            multistate::attributes(cluster)
        }
    }
}
