//! Asynchronous delivery of device events.
//!
//! The protocol stack delivers reports and commands from its own I/O task,
//! never from the caller's thread. `ZclDispatcher` models that: events are
//! queued on an mpsc channel and a tokio task hands them to the clusters of
//! the registered endpoints, which notify their listeners.

use super::local::LocalEndpoint;
use super::{ZclCommand, ZclValue, ZigBeeEndpoint};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// An event coming from a device.
#[derive(Clone, Debug, PartialEq)]
pub enum ZclEvent {
    /// Attribute report or read response.
    AttributeReport {
        endpoint_id: u8,
        cluster_id: u16,
        /// `true` for a server-role cluster, `false` for client role
        server: bool,
        attribute_id: u16,
        value: ZclValue,
    },
    /// Command issued by the device.
    CommandReceived { endpoint_id: u8, command: ZclCommand },
}

/// Routes device events to local endpoints.
pub struct ZclDispatcher {
    endpoints: HashMap<u8, Arc<LocalEndpoint>>,
}

impl ZclDispatcher {
    pub fn new() -> Self {
        Self {
            endpoints: HashMap::new(),
        }
    }

    /// Add an endpoint to route events to.
    pub fn with_endpoint(mut self, endpoint: Arc<LocalEndpoint>) -> Self {
        self.endpoints.insert(endpoint.endpoint_id(), endpoint);
        self
    }

    /// Deliver one event. Returns the number of listeners notified.
    pub fn dispatch(&self, event: &ZclEvent) -> usize {
        match event {
            ZclEvent::AttributeReport {
                endpoint_id,
                cluster_id,
                server,
                attribute_id,
                value,
            } => {
                let Some(endpoint) = self.endpoints.get(endpoint_id) else {
                    warn!("[Dispatch] No endpoint {} for attribute report", endpoint_id);
                    return 0;
                };
                let cluster = if *server {
                    endpoint.local_input_cluster(*cluster_id)
                } else {
                    endpoint.local_output_cluster(*cluster_id)
                };
                match cluster {
                    Some(cluster) => cluster.report_attribute(*attribute_id, value.clone()),
                    None => {
                        debug!(
                            "[Dispatch] Endpoint {} has no cluster 0x{:04X} for report",
                            endpoint_id, cluster_id
                        );
                        0
                    }
                }
            }
            ZclEvent::CommandReceived {
                endpoint_id,
                command,
            } => {
                let Some(endpoint) = self.endpoints.get(endpoint_id) else {
                    warn!("[Dispatch] No endpoint {} for command", endpoint_id);
                    return 0;
                };
                // Commands come from the device's client cluster; fall back to
                // the server cluster for devices that echo commands there.
                let cluster = endpoint
                    .local_output_cluster(command.cluster_id())
                    .or_else(|| endpoint.local_input_cluster(command.cluster_id()));
                match cluster {
                    Some(cluster) => cluster.receive_command(*command),
                    None => {
                        debug!(
                            "[Dispatch] Endpoint {} has no cluster for {}",
                            endpoint_id, command
                        );
                        0
                    }
                }
            }
        }
    }

    /// Start the dispatch task.
    ///
    /// Returns the sender to queue events on and the task handle. The task
    /// ends when every sender is dropped and yields the number of events
    /// it processed.
    pub fn start(self, capacity: usize) -> (mpsc::Sender<ZclEvent>, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::channel::<ZclEvent>(capacity);
        let handle = tokio::spawn(async move {
            info!(
                "[Dispatch] Started for {} endpoint(s)",
                self.endpoints.len()
            );
            let mut processed = 0;
            while let Some(event) = rx.recv().await {
                self.dispatch(&event);
                processed += 1;
            }
            info!("[Dispatch] Stopped after {} event(s)", processed);
            processed
        });
        (tx, handle)
    }
}

impl Default for ZclDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zcl::clusters::on_off;
    use crate::zcl::{IeeeAddress, OnOffCommand, ZclCluster, ZclClusterType};

    fn endpoint() -> Arc<LocalEndpoint> {
        let endpoint = Arc::new(LocalEndpoint::new(IeeeAddress(0xAB), 0x2222, 3));
        endpoint.add_input_cluster(ZclClusterType::OnOff);
        endpoint
    }

    #[test]
    fn test_dispatch_report_to_server_cluster() {
        let endpoint = endpoint();
        let dispatcher = ZclDispatcher::new().with_endpoint(endpoint.clone());
        dispatcher.dispatch(&ZclEvent::AttributeReport {
            endpoint_id: 3,
            cluster_id: on_off::CLUSTER_ID,
            server: true,
            attribute_id: on_off::ATTR_ONOFF,
            value: ZclValue::Boolean(true),
        });
        let cluster = endpoint.local_input_cluster(on_off::CLUSTER_ID).unwrap();
        assert_eq!(
            cluster.attribute(on_off::ATTR_ONOFF).unwrap().last_value(),
            Some(&ZclValue::Boolean(true))
        );
    }

    #[test]
    fn test_dispatch_unknown_endpoint_is_dropped() {
        let dispatcher = ZclDispatcher::new().with_endpoint(endpoint());
        let delivered = dispatcher.dispatch(&ZclEvent::CommandReceived {
            endpoint_id: 9,
            command: ZclCommand::OnOff(OnOffCommand::On),
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_task_processes_until_senders_drop() {
        let endpoint = endpoint();
        let (tx, handle) = ZclDispatcher::new().with_endpoint(endpoint.clone()).start(8);
        for value in [true, false] {
            tx.send(ZclEvent::AttributeReport {
                endpoint_id: 3,
                cluster_id: on_off::CLUSTER_ID,
                server: true,
                attribute_id: on_off::ATTR_ONOFF,
                value: ZclValue::Boolean(value),
            })
            .await
            .unwrap();
        }
        drop(tx);

        assert_eq!(handle.await.unwrap(), 2);
        let cluster = endpoint.local_input_cluster(on_off::CLUSTER_ID).unwrap();
        assert_eq!(
            cluster.attribute(on_off::ATTR_ONOFF).unwrap().last_value(),
            Some(&ZclValue::Boolean(false))
        );
    }
}
