//! Bind and listener bookkeeping shared by every converter.

use crate::zcl::{
    IeeeAddress, ZclAttributeListener, ZclCluster, ZclCommandListener, ZigBeeEndpoint,
};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

enum Registration {
    Attribute(Arc<dyn ZclCluster>, Arc<dyn ZclAttributeListener>),
    Command(Arc<dyn ZclCluster>, Arc<dyn ZclCommandListener>),
}

/// The server and/or client cluster a converter opened, plus the listener
/// registrations it made on them.
///
/// `release` removes exactly what `register` added, so disposing twice or
/// disposing after a partial initialisation leaves nothing behind.
pub struct ClusterBinding {
    ieee: IeeeAddress,
    server: Option<Arc<dyn ZclCluster>>,
    client: Option<Arc<dyn ZclCluster>>,
    registrations: Mutex<Vec<Registration>>,
}

impl ClusterBinding {
    /// Look up the server cluster `server_id` and the client cluster
    /// `client_id`. Returns `None` if neither exists.
    pub fn locate(endpoint: &dyn ZigBeeEndpoint, server_id: u16, client_id: u16) -> Option<Self> {
        let server = endpoint.input_cluster(server_id);
        let client = endpoint.output_cluster(client_id);
        if server.is_none() && client.is_none() {
            return None;
        }
        Some(Self {
            ieee: endpoint.ieee_address(),
            server,
            client,
            registrations: Mutex::new(Vec::new()),
        })
    }

    /// Whether `locate` would find anything. Performs no I/O.
    pub fn is_present(endpoint: &dyn ZigBeeEndpoint, server_id: u16, client_id: u16) -> bool {
        endpoint.input_cluster(server_id).is_some() || endpoint.output_cluster(client_id).is_some()
    }

    pub fn server(&self) -> Option<&Arc<dyn ZclCluster>> {
        self.server.as_ref()
    }

    pub fn client(&self) -> Option<&Arc<dyn ZclCluster>> {
        self.client.as_ref()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Arc<dyn ZclCluster>> {
        self.server.iter().chain(self.client.iter())
    }

    /// Send a bind request to every cluster. Failures are logged only: some
    /// devices do not support binding and report periodically instead.
    /// Returns the number of accepted requests.
    pub fn bind(&self) -> usize {
        let mut accepted = 0;
        for cluster in self.clusters() {
            match cluster.bind() {
                Ok(()) => accepted += 1,
                Err(e) => warn!(
                    "{}: Bind of {} {} cluster failed: {}",
                    self.ieee,
                    role(cluster.as_ref()),
                    cluster.cluster_type(),
                    e
                ),
            }
        }
        accepted
    }

    /// Register both listeners on every cluster.
    pub fn register(
        &self,
        attribute_listener: &Arc<dyn ZclAttributeListener>,
        command_listener: &Arc<dyn ZclCommandListener>,
    ) {
        let mut registrations = self.registrations.lock();
        for cluster in self.clusters() {
            if cluster.add_attribute_listener(attribute_listener.clone()) {
                registrations.push(Registration::Attribute(
                    cluster.clone(),
                    attribute_listener.clone(),
                ));
            }
            if cluster.add_command_listener(command_listener.clone()) {
                registrations.push(Registration::Command(
                    cluster.clone(),
                    command_listener.clone(),
                ));
            }
        }
    }

    /// Remove every registration made by `register`. Returns how many were
    /// removed; a second call returns 0.
    pub fn release(&self) -> usize {
        let registrations = std::mem::take(&mut *self.registrations.lock());
        let count = registrations.len();
        for registration in registrations {
            match registration {
                Registration::Attribute(cluster, listener) => {
                    cluster.remove_attribute_listener(&listener);
                }
                Registration::Command(cluster, listener) => {
                    cluster.remove_command_listener(&listener);
                }
            }
        }
        count
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Request the given attributes from the server cluster. Client-only
    /// bindings have nothing to read. Returns the number of queued reads.
    pub fn read_attributes(&self, attribute_ids: &[u16]) -> usize {
        let Some(server) = &self.server else {
            debug!("{}: No server cluster to read from", self.ieee);
            return 0;
        };
        let mut queued = 0;
        for id in attribute_ids {
            match server.read_attribute(*id) {
                Ok(()) => queued += 1,
                Err(e) => warn!(
                    "{}: Read of {} attribute 0x{:04X} failed: {}",
                    self.ieee,
                    server.cluster_type(),
                    id,
                    e
                ),
            }
        }
        queued
    }
}

fn role(cluster: &dyn ZclCluster) -> &'static str {
    if cluster.is_server() { "server" } else { "client" }
}
