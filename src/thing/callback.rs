//! Callback the converters push channel state into.

use super::{ChannelUid, State};
use log::warn;
use serde::Serialize;
use tokio::sync::mpsc;

/// Host side of the channel: receives state updates and trigger events.
///
/// Implementations must not block or call back into a converter; they are
/// called from the protocol stack's delivery threads while the converter holds
/// its state lock.
pub trait ThingHandlerCallback: Send + Sync + 'static {
    /// Persisted channel state changed.
    fn update_channel_state(&self, channel: &ChannelUid, state: State);

    /// Fire a stateless trigger channel once.
    fn trigger_channel(&self, channel: &ChannelUid, event: &str);
}

/// A channel update as seen by the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ChannelEvent {
    StateUpdated { channel: ChannelUid, state: State },
    Triggered { channel: ChannelUid, event: String },
}

/// Callback that forwards every update to an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelEventSender {
    tx: mpsc::UnboundedSender<ChannelEvent>,
}

impl ThingHandlerCallback for ChannelEventSender {
    fn update_channel_state(&self, channel: &ChannelUid, state: State) {
        let event = ChannelEvent::StateUpdated {
            channel: channel.clone(),
            state,
        };
        if self.tx.send(event).is_err() {
            warn!("Channel event receiver closed, dropping update for {}", channel);
        }
    }

    fn trigger_channel(&self, channel: &ChannelUid, event: &str) {
        let event = ChannelEvent::Triggered {
            channel: channel.clone(),
            event: event.to_string(),
        };
        if self.tx.send(event).is_err() {
            warn!("Channel event receiver closed, dropping trigger for {}", channel);
        }
    }
}

/// Create a callback and the receiver its events arrive on.
pub fn channel_events() -> (ChannelEventSender, mpsc::UnboundedReceiver<ChannelEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelEventSender { tx }, rx)
}
