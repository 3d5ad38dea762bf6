//! In-process ZigBee endpoint and cluster implementation.
//!
//! Stands in for the protocol stack: it keeps attribute values, fans out
//! reports and received commands to listeners, and records every request a
//! converter makes (bind, read, write, command) instead of putting it on air.
//! The simulation binary and the converter tests both drive devices through it.

use super::clusters::attribute_table;
use super::{
    EndpointAddress, IeeeAddress, ListenerSet, ZclAttribute, ZclAttributeListener, ZclCluster,
    ZclClusterType, ZclCommand, ZclCommandListener, ZclValue, ZigBeeEndpoint,
};
use crate::error::ZclError;
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A request a converter issued against a cluster.
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterRequest {
    Bind,
    Read(u16),
    Write(u16, ZclValue),
    Command(ZclCommand),
}

/// Cluster held in memory.
pub struct LocalCluster {
    cluster_type: ZclClusterType,
    server: bool,
    attributes: RwLock<HashMap<u16, ZclAttribute>>,
    attribute_listeners: ListenerSet<dyn ZclAttributeListener>,
    command_listeners: ListenerSet<dyn ZclCommandListener>,
    bind_failure: Mutex<Option<String>>,
    requests: Mutex<Vec<ClusterRequest>>,
}

impl LocalCluster {
    pub fn new(cluster_type: ZclClusterType, server: bool) -> Self {
        let attributes = attribute_table(cluster_type)
            .into_iter()
            .map(|a| (a.id(), a))
            .collect();
        Self {
            cluster_type,
            server,
            attributes: RwLock::new(attributes),
            attribute_listeners: ListenerSet::new(),
            command_listeners: ListenerSet::new(),
            bind_failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make every following bind request fail with the given reason.
    pub fn fail_binds(&self, reason: impl Into<String>) {
        *self.bind_failure.lock() = Some(reason.into());
    }

    /// Requests issued so far, oldest first.
    pub fn requests(&self) -> Vec<ClusterRequest> {
        self.requests.lock().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    pub fn bind_count(&self) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| matches!(r, ClusterRequest::Bind))
            .count()
    }

    pub fn read_requests(&self) -> Vec<u16> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| match r {
                ClusterRequest::Read(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn sent_commands(&self) -> Vec<ZclCommand> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| match r {
                ClusterRequest::Command(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    pub fn attribute_listener_count(&self) -> usize {
        self.attribute_listeners.len()
    }

    pub fn command_listener_count(&self) -> usize {
        self.command_listeners.len()
    }

    /// Device reports a new attribute value.
    ///
    /// Stores the value and notifies every attribute listener. Unknown
    /// attribute identifiers are dropped, as the stack would drop them.
    /// Returns the number of listeners notified.
    pub fn report_attribute(&self, attribute_id: u16, value: ZclValue) -> usize {
        let attribute = {
            let mut attributes = self.attributes.write();
            let Some(attribute) = attributes.get_mut(&attribute_id) else {
                debug!(
                    "{}: dropping report for unknown attribute 0x{:04X}",
                    self.cluster_type, attribute_id
                );
                return 0;
            };
            if !attribute.data_type().accepts(&value) {
                debug!(
                    "{}: {} does not fit attribute 0x{:04X} of type {:?}",
                    self.cluster_type,
                    value,
                    attribute_id,
                    attribute.data_type()
                );
            }
            attribute.update_value(value);
            attribute.clone()
        };

        let listeners = self.attribute_listeners.snapshot();
        trace!(
            "{}: delivering {} to {} listener(s)",
            self.cluster_type,
            attribute,
            listeners.len()
        );
        for listener in &listeners {
            listener.attribute_updated(&attribute);
        }
        listeners.len()
    }

    /// Device issues a command. Returns the number of listeners notified.
    pub fn receive_command(&self, command: ZclCommand) -> usize {
        let listeners = self.command_listeners.snapshot();
        trace!(
            "{}: delivering {} to {} listener(s)",
            self.cluster_type,
            command,
            listeners.len()
        );
        for listener in &listeners {
            listener.command_received(&command);
        }
        listeners.len()
    }

    fn record(&self, request: ClusterRequest) {
        self.requests.lock().push(request);
    }
}

impl ZclCluster for LocalCluster {
    fn cluster_type(&self) -> ZclClusterType {
        self.cluster_type
    }

    fn is_server(&self) -> bool {
        self.server
    }

    fn bind(&self) -> Result<(), ZclError> {
        self.record(ClusterRequest::Bind);
        match self.bind_failure.lock().as_ref() {
            Some(reason) => Err(ZclError::BindFailed {
                cluster: self.cluster_type,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn add_attribute_listener(&self, listener: Arc<dyn ZclAttributeListener>) -> bool {
        self.attribute_listeners.add(listener)
    }

    fn remove_attribute_listener(&self, listener: &Arc<dyn ZclAttributeListener>) -> bool {
        self.attribute_listeners.remove(listener)
    }

    fn add_command_listener(&self, listener: Arc<dyn ZclCommandListener>) -> bool {
        self.command_listeners.add(listener)
    }

    fn remove_command_listener(&self, listener: &Arc<dyn ZclCommandListener>) -> bool {
        self.command_listeners.remove(listener)
    }

    fn attribute(&self, attribute_id: u16) -> Option<ZclAttribute> {
        self.attributes.read().get(&attribute_id).cloned()
    }

    fn read_attribute(&self, attribute_id: u16) -> Result<(), ZclError> {
        if !self.attributes.read().contains_key(&attribute_id) {
            return Err(ZclError::UnsupportedAttribute {
                cluster: self.cluster_type,
                attribute: attribute_id,
            });
        }
        self.record(ClusterRequest::Read(attribute_id));
        Ok(())
    }

    fn write_attribute(&self, attribute_id: u16, value: ZclValue) -> Result<(), ZclError> {
        let (writable, data_type) = match self.attributes.read().get(&attribute_id) {
            Some(attribute) => (attribute.is_writable(), attribute.data_type()),
            None => {
                return Err(ZclError::UnsupportedAttribute {
                    cluster: self.cluster_type,
                    attribute: attribute_id,
                });
            }
        };
        if !writable {
            return Err(ZclError::ReadOnlyAttribute {
                cluster: self.cluster_type,
                attribute: attribute_id,
            });
        }
        if !data_type.accepts(&value) {
            return Err(ZclError::Rejected(format!(
                "{} does not fit {} attribute 0x{:04X} of type {:?}",
                value, self.cluster_type, attribute_id, data_type
            )));
        }
        self.record(ClusterRequest::Write(attribute_id, value));
        Ok(())
    }

    fn send_command(&self, command: ZclCommand) -> Result<(), ZclError> {
        if command.cluster_id() != self.cluster_type.id() {
            return Err(ZclError::Rejected(format!(
                "{} sent to cluster {}",
                command, self.cluster_type
            )));
        }
        self.record(ClusterRequest::Command(command));
        Ok(())
    }
}

/// Endpoint held in memory. Clusters may be added after creation, as they
/// are during node discovery.
pub struct LocalEndpoint {
    ieee_address: IeeeAddress,
    address: EndpointAddress,
    input_clusters: RwLock<BTreeMap<u16, Arc<LocalCluster>>>,
    output_clusters: RwLock<BTreeMap<u16, Arc<LocalCluster>>>,
}

impl LocalEndpoint {
    pub fn new(ieee_address: IeeeAddress, network_address: u16, endpoint_id: u8) -> Self {
        Self {
            ieee_address,
            address: EndpointAddress {
                network_address,
                endpoint_id,
            },
            input_clusters: RwLock::new(BTreeMap::new()),
            output_clusters: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add (or return the existing) server-role cluster.
    pub fn add_input_cluster(&self, cluster_type: ZclClusterType) -> Arc<LocalCluster> {
        self.input_clusters
            .write()
            .entry(cluster_type.id())
            .or_insert_with(|| Arc::new(LocalCluster::new(cluster_type, true)))
            .clone()
    }

    /// Add (or return the existing) client-role cluster.
    pub fn add_output_cluster(&self, cluster_type: ZclClusterType) -> Arc<LocalCluster> {
        self.output_clusters
            .write()
            .entry(cluster_type.id())
            .or_insert_with(|| Arc::new(LocalCluster::new(cluster_type, false)))
            .clone()
    }

    pub fn local_input_cluster(&self, cluster_id: u16) -> Option<Arc<LocalCluster>> {
        self.input_clusters.read().get(&cluster_id).cloned()
    }

    pub fn local_output_cluster(&self, cluster_id: u16) -> Option<Arc<LocalCluster>> {
        self.output_clusters.read().get(&cluster_id).cloned()
    }
}

impl ZigBeeEndpoint for LocalEndpoint {
    fn address(&self) -> EndpointAddress {
        self.address
    }

    fn ieee_address(&self) -> IeeeAddress {
        self.ieee_address
    }

    fn input_cluster(&self, cluster_id: u16) -> Option<Arc<dyn ZclCluster>> {
        self.local_input_cluster(cluster_id)
            .map(|c| c as Arc<dyn ZclCluster>)
    }

    fn output_cluster(&self, cluster_id: u16) -> Option<Arc<dyn ZclCluster>> {
        self.local_output_cluster(cluster_id)
            .map(|c| c as Arc<dyn ZclCluster>)
    }

    fn input_cluster_ids(&self) -> Vec<u16> {
        self.input_clusters.read().keys().copied().collect()
    }

    fn output_cluster_ids(&self) -> Vec<u16> {
        self.output_clusters.read().keys().copied().collect()
    }
}
