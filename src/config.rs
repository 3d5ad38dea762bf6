use crate::error::{BridgeError, Result};
use crate::zcl::IeeeAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load `KEY=value` pairs from `./.env` into the process environment.
/// Quotes around a value are optional; variables already set are kept.
///
/// Must run before any other thread exists. The binary calls it first thing
/// in its synchronous `main`, before the tokio runtime is built.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = &value[1..value.len() - 1];
            }

            if std::env::var(key).is_err() {
                // SAFETY: the process is still single-threaded; `main` builds
                // its runtime only after this returns
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

/// Process-wide binding configuration.
///
/// Built once at startup, wrapped in an `Arc` and handed to every converter.
/// Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Prefix of every channel type and thing UID
    pub binding_id: String,
    /// Send bind requests to the clusters a converter opens
    pub bind_clusters: bool,
    /// Request the current attribute values when a converter opens
    pub read_on_initialize: bool,
    pub simulation: SimulationConfig,
}

/// Simulated device driven by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub interval_ms: u64,
    /// IEEE address as hex
    pub ieee_address: String,
    pub network_address: u16,
    pub endpoint_id: u8,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            binding_id: "zigbee".to_string(),
            bind_clusters: true,
            read_on_initialize: true,
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            ieee_address: "00124B0012345678".to_string(),
            network_address: 0x1234,
            endpoint_id: 1,
        }
    }
}

impl SimulationConfig {
    pub fn ieee(&self) -> Result<IeeeAddress> {
        self.ieee_address.parse().map_err(|e| {
            BridgeError::Config(format!(
                "simulation.ieee_address {:?} is not hex: {}",
                self.ieee_address, e
            ))
        })
    }
}

impl BindingConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load from a JSON file; missing fields take their default.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = std::env::var("ZIGBEE_BINDING_ID")
            && !id.trim().is_empty()
        {
            self.binding_id = id.trim().to_string();
        }
        if let Ok(bind) = std::env::var("ZIGBEE_BIND_CLUSTERS")
            && let Some(b) = parse_flag(&bind)
        {
            self.bind_clusters = b;
        }
        if let Ok(read) = std::env::var("ZIGBEE_READ_ON_INIT")
            && let Some(r) = parse_flag(&read)
        {
            self.read_on_initialize = r;
        }
        if let Ok(interval) = std::env::var("ZIGBEE_SIM_INTERVAL_MS")
            && let Ok(i) = interval.parse()
        {
            self.simulation.interval_ms = i;
        }
        if let Ok(ieee) = std::env::var("ZIGBEE_SIM_IEEE") {
            self.simulation.ieee_address = ieee;
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.binding_id.is_empty() || self.binding_id.contains(':') {
            return Err(BridgeError::Config(format!(
                "binding_id must be non-empty and contain no ':' (got {:?})",
                self.binding_id
            )));
        }
        if self.simulation.interval_ms == 0 {
            return Err(BridgeError::Config(
                "simulation.interval_ms must be greater than zero".to_string(),
            ));
        }
        self.simulation.ieee()?;
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
