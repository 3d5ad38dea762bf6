//! Simulated device for development and testing.
//!
//! Builds a local endpoint carrying every cluster the converters know and
//! replays a fixed script of reports and commands through the dispatcher.

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::zcl::clusters::{basic, multistate, on_off};
use crate::zcl::dispatch::ZclEvent;
use crate::zcl::local::LocalEndpoint;
use crate::zcl::{OnOffCommand, ZclClusterType, ZclCommand, ZclValue};
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

const STATE_TEXT: [&str; 3] = ["Idle", "Heating", "Cooling"];

/// Endpoint of the simulated device: a wall switch wired to a load, plus a
/// multistate mode selector.
pub fn build_endpoint(config: &SimulationConfig) -> Result<Arc<LocalEndpoint>> {
    let endpoint = LocalEndpoint::new(config.ieee()?, config.network_address, config.endpoint_id);

    let basic = endpoint.add_input_cluster(ZclClusterType::Basic);
    basic.report_attribute(
        basic::ATTR_MANUFACTURERNAME,
        ZclValue::CharString("Simulated".to_string()),
    );
    basic.report_attribute(
        basic::ATTR_MODELIDENTIFIER,
        ZclValue::CharString("sim-switch-1".to_string()),
    );

    endpoint.add_input_cluster(ZclClusterType::OnOff);
    endpoint.add_output_cluster(ZclClusterType::OnOff);

    let mode = endpoint.add_input_cluster(ZclClusterType::MultistateInputBasic);
    mode.report_attribute(
        multistate::ATTR_NUMBEROFSTATES,
        ZclValue::Unsigned(STATE_TEXT.len() as u32),
    );
    endpoint.add_output_cluster(ZclClusterType::MultistateOutputBasic);

    Ok(Arc::new(endpoint))
}

/// Event number `step` of the replay script.
pub fn script_event(step: u64, endpoint_id: u8) -> ZclEvent {
    let round = step / 5;
    match step % 5 {
        0 => ZclEvent::AttributeReport {
            endpoint_id,
            cluster_id: multistate::INPUT_CLUSTER_ID,
            server: true,
            attribute_id: multistate::ATTR_STATETEXT,
            value: ZclValue::StringArray(STATE_TEXT.iter().map(|s| s.to_string()).collect()),
        },
        1 => ZclEvent::AttributeReport {
            endpoint_id,
            cluster_id: on_off::CLUSTER_ID,
            server: true,
            attribute_id: on_off::ATTR_ONOFF,
            value: ZclValue::Boolean(round % 2 == 0),
        },
        2 => ZclEvent::CommandReceived {
            endpoint_id,
            command: ZclCommand::OnOff(OnOffCommand::Toggle),
        },
        3 => ZclEvent::AttributeReport {
            endpoint_id,
            cluster_id: multistate::INPUT_CLUSTER_ID,
            server: true,
            attribute_id: multistate::ATTR_PRESENTVALUE,
            value: ZclValue::Unsigned((round % STATE_TEXT.len() as u64) as u32 + 1),
        },
        _ => ZclEvent::CommandReceived {
            endpoint_id,
            command: ZclCommand::OnOff(if round % 2 == 0 {
                OnOffCommand::OffWithEffect {
                    effect_id: 0,
                    effect_variant: 0,
                }
            } else {
                OnOffCommand::On
            }),
        },
    }
}

/// Spawn a task that queues one script event per tick.
///
/// The task ends when the dispatcher stops accepting events.
pub fn run_device_simulation(
    events: mpsc::Sender<ZclEvent>,
    endpoint_id: u8,
    interval_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_millis(interval_ms));
        let mut step = 0u64;
        loop {
            interval.tick().await;
            let event = script_event(step, endpoint_id);
            info!("[Sim] {:?}", event);
            if events.send(event).await.is_err() {
                info!("[Sim] Dispatcher closed, stopping");
                break;
            }
            step += 1;
        }
    })
}
