//! Test fixture: a local endpoint plus a recording host callback.

use super::ConverterContext;
use crate::config::BindingConfig;
use crate::thing::{
    ChannelEvent, ChannelUid, State, ThingHandlerCallback, ThingUid, channel_events,
};
use crate::zcl::IeeeAddress;
use crate::zcl::local::LocalEndpoint;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub struct Fixture {
    pub thing_uid: ThingUid,
    pub endpoint: Arc<LocalEndpoint>,
    pub context: ConverterContext,
    events: UnboundedReceiver<ChannelEvent>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(BindingConfig::default())
    }

    pub fn with_config(config: BindingConfig) -> Self {
        let thing_uid = ThingUid::new("zigbee", "device", "00124b0012345678");
        let endpoint = Arc::new(LocalEndpoint::new(
            IeeeAddress(0x0012_4B00_1234_5678),
            0x1234,
            1,
        ));
        let (callback, events) = channel_events();
        let context = ConverterContext {
            thing_uid: thing_uid.clone(),
            endpoint: endpoint.clone(),
            callback: Arc::new(callback),
            config: Arc::new(config),
        };
        Self {
            thing_uid,
            endpoint,
            context,
            events,
        }
    }

    /// Every channel event pushed since the last call.
    pub fn drain(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Same endpoint and config, with updates going to `callback` instead.
    pub fn context_with(&self, callback: Arc<dyn ThingHandlerCallback>) -> ConverterContext {
        ConverterContext {
            callback,
            ..self.context.clone()
        }
    }
}

/// Host that records every update and stalls on one state value, to widen
/// the window between a converter deciding on a value and the host seeing it.
pub struct SlowHost {
    stall_on: String,
    stalled: AtomicBool,
    published: Mutex<Vec<String>>,
}

impl SlowHost {
    pub fn new(stall_on: &str) -> Arc<Self> {
        Arc::new(Self {
            stall_on: stall_on.to_string(),
            stalled: AtomicBool::new(false),
            published: Mutex::new(Vec::new()),
        })
    }

    /// Whether an update for the stall value has started.
    pub fn has_stalled(&self) -> bool {
        self.stalled.load(Ordering::SeqCst)
    }

    /// Block until an update for the stall value has started.
    pub fn wait_for_stall(&self) {
        while !self.has_stalled() {
            thread::yield_now();
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().clone()
    }
}

impl ThingHandlerCallback for SlowHost {
    fn update_channel_state(&self, _channel: &ChannelUid, state: State) {
        let text = state.to_string();
        if text == self.stall_on && !self.stalled.swap(true, Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(200));
        }
        self.published.lock().push(text);
    }

    fn trigger_channel(&self, _channel: &ChannelUid, event: &str) {
        self.published.lock().push(format!("trigger {}", event));
    }
}
