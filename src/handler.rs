//! Per-device orchestration: one handler per thing, owning the converters of
//! all its endpoints.

use crate::config::BindingConfig;
use crate::converter::{ActiveConverter, ConverterRegistry, ZigBeeChannelConverter};
use crate::thing::{Channel, ChannelUid, HostCommand, ThingHandlerCallback, ThingUid};
use crate::zcl::ZigBeeEndpoint;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct ZigBeeThingHandler {
    thing_uid: ThingUid,
    callback: Arc<dyn ThingHandlerCallback>,
    config: Arc<BindingConfig>,
    registry: ConverterRegistry,
    converters: RwLock<Vec<ActiveConverter>>,
}

impl ZigBeeThingHandler {
    pub fn new(
        thing_uid: ThingUid,
        callback: Arc<dyn ThingHandlerCallback>,
        config: Arc<BindingConfig>,
    ) -> Self {
        Self::with_registry(thing_uid, callback, config, ConverterRegistry::default())
    }

    pub fn with_registry(
        thing_uid: ThingUid,
        callback: Arc<dyn ThingHandlerCallback>,
        config: Arc<BindingConfig>,
        registry: ConverterRegistry,
    ) -> Self {
        Self {
            thing_uid,
            callback,
            config,
            registry,
            converters: RwLock::new(Vec::new()),
        }
    }

    pub fn thing_uid(&self) -> &ThingUid {
        &self.thing_uid
    }

    /// Create converters for every endpoint of the device. Returns the number
    /// of channels added.
    pub fn initialize_endpoints(&self, endpoints: &[Arc<dyn ZigBeeEndpoint>]) -> usize {
        let mut created = Vec::new();
        for endpoint in endpoints {
            created.extend(self.registry.create_converters(
                &self.thing_uid,
                endpoint.clone(),
                self.callback.clone(),
                self.config.clone(),
            ));
        }

        let count = created.len();
        self.converters.write().extend(created);
        info!(
            "[Thing] {}: {} channel(s) from {} endpoint(s)",
            self.thing_uid,
            count,
            endpoints.len()
        );
        count
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.converters
            .read()
            .iter()
            .map(|active| active.channel.clone())
            .collect()
    }

    fn converter(&self, channel_uid: &ChannelUid) -> Option<Arc<dyn ZigBeeChannelConverter>> {
        self.converters
            .read()
            .iter()
            .find(|active| &active.channel.uid == channel_uid)
            .map(|active| active.converter.clone())
    }

    /// Route a host command to the converter owning `channel_uid`.
    pub fn handle_command(&self, channel_uid: &ChannelUid, command: &HostCommand) {
        // Lock released before the converter runs
        let Some(converter) = self.converter(channel_uid) else {
            warn!("[Thing] No converter for channel {}", channel_uid);
            return;
        };
        debug!("[Thing] {} <- {:?}", channel_uid, command);
        converter.handle_command(command);
    }

    pub fn refresh_all(&self) {
        let converters: Vec<_> = self
            .converters
            .read()
            .iter()
            .map(|active| active.converter.clone())
            .collect();
        for converter in converters {
            converter.handle_refresh();
        }
    }

    /// Dispose every converter. Safe to call repeatedly.
    pub fn dispose(&self) {
        let converters = std::mem::take(&mut *self.converters.write());
        if converters.is_empty() {
            return;
        }
        info!(
            "[Thing] {}: disposing {} converter(s)",
            self.thing_uid,
            converters.len()
        );
        for active in converters {
            active.converter.dispose_converter();
        }
    }
}

impl Drop for ZigBeeThingHandler {
    fn drop(&mut self) {
        // Listener registrations hold the converters alive otherwise
        self.dispose();
    }
}
