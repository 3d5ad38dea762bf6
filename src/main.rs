use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use zigbee_channel_bridge::config::{BindingConfig, load_dotenv};
use zigbee_channel_bridge::constants::THING_TYPE_DEVICE;
use zigbee_channel_bridge::error::{BridgeError, Result};
use zigbee_channel_bridge::handler::ZigBeeThingHandler;
use zigbee_channel_bridge::simulation::{build_endpoint, run_device_simulation};
use zigbee_channel_bridge::thing::{
    ChannelEvent, HostCommand, OnOffType, PercentType, ThingUid, channel_events,
};
use zigbee_channel_bridge::zcl::ZigBeeEndpoint;
use zigbee_channel_bridge::zcl::dispatch::ZclDispatcher;

#[derive(Parser)]
#[command(name = "zigbee-channel-bridge")]
#[command(about = "Bridge a simulated ZigBee device to host channels")]
struct Cli {
    /// JSON configuration file; environment variables override it
    #[arg(long, env = "ZIGBEE_CONFIG")]
    config: Option<PathBuf>,

    /// Interval between simulated device events
    #[arg(long, env = "ZIGBEE_SIM_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Do not send bind requests to the device
    #[arg(long)]
    no_bind: bool,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_config(cli: &Cli) -> Result<BindingConfig> {
    let mut config = match &cli.config {
        Some(path) => BindingConfig::from_json_file(path)?.with_env_overrides(),
        None => BindingConfig::from_env(),
    };
    if let Some(interval_ms) = cli.interval_ms {
        config.simulation.interval_ms = interval_ms;
    }
    if cli.no_bind {
        config.bind_clusters = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    // Environment is set up before the runtime starts any worker thread
    load_dotenv();
    init_logger();
    let cli = Cli::parse();

    let result = tokio::runtime::Runtime::new()
        .map_err(BridgeError::from)
        .and_then(|runtime| runtime.block_on(run(cli)));
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting ZigBee channel bridge");
    let config = Arc::new(load_config(&cli)?);
    info!("Configuration loaded:");
    info!("  Binding: {}", config.binding_id);
    info!("  Bind clusters: {}", config.bind_clusters);
    info!("  Read on initialize: {}", config.read_on_initialize);
    info!("  Simulation interval: {} ms", config.simulation.interval_ms);

    let endpoint = build_endpoint(&config.simulation)?;
    let thing_uid = ThingUid::new(
        &config.binding_id,
        THING_TYPE_DEVICE,
        &endpoint.ieee_address().to_string().to_lowercase(),
    );

    let (callback, mut events) = channel_events();
    let handler = Arc::new(ZigBeeThingHandler::new(
        thing_uid,
        Arc::new(callback),
        config.clone(),
    ));
    let endpoints = vec![endpoint.clone() as Arc<dyn ZigBeeEndpoint>];
    handler.initialize_endpoints(&endpoints);
    info!(
        "Channels:\n{}",
        serde_json::to_string_pretty(&handler.channels())?
    );

    let event_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ChannelEvent::StateUpdated { channel, state } => {
                    info!("[Host] {} = {}", channel, state);
                }
                ChannelEvent::Triggered { channel, event } => {
                    info!("[Host] {} triggered {}", channel, event);
                }
            }
        }
    });

    let (dispatch_tx, dispatch_task) = ZclDispatcher::new()
        .with_endpoint(endpoint.clone())
        .start(64);
    let sim_task = run_device_simulation(
        dispatch_tx,
        config.simulation.endpoint_id,
        config.simulation.interval_ms,
    );

    // Host side: drive the switch the way a dimmer widget would
    let host_handler = handler.clone();
    let interval_ms = config.simulation.interval_ms.saturating_mul(3);
    let host_task = tokio::spawn(async move {
        let commands = [
            HostCommand::Percent(PercentType::ZERO),
            HostCommand::Percent(PercentType::new(60).unwrap_or(PercentType::HUNDRED)),
            HostCommand::OnOff(OnOffType::Off),
            HostCommand::Refresh,
        ];
        let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(interval_ms));
        for command in commands.iter().cycle() {
            interval.tick().await;
            for channel in host_handler.channels() {
                host_handler.handle_command(&channel.uid, command);
            }
        }
    });

    info!("ZigBee channel bridge is running");
    info!("  - Press Ctrl+C to exit");

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    host_task.abort();
    sim_task.abort();
    dispatch_task.abort();
    handler.dispose();
    event_task.abort();

    info!("ZigBee channel bridge stopped");
    Ok(())
}
