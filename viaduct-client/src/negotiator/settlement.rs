use std::sync::Mutex;
use tokio::sync::oneshot;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Terminal signals that can settle a negotiation. Both the
/// channel-open callback and the connection-failure callback race to
/// deliver one; whichever arrives first wins.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SettleSignal {
    ChannelOpen,
    TransportFailed(RTCPeerConnectionState),
}

/// One-shot settlement guard. `settle` consumes the sender under a
/// lock, so duplicate open or failure signals after the first are
/// dropped rather than double-settling the result.
pub(crate) struct Settlement {
    slot: Mutex<Option<oneshot::Sender<SettleSignal>>>,
}

impl Settlement {
    pub(crate) fn new() -> (Self, oneshot::Receiver<SettleSignal>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Deliver a terminal signal. Returns whether this call won the
    /// race; losers are ignored.
    pub(crate) fn settle(&self, signal: SettleSignal) -> bool {
        let sender = self.slot.lock().expect("settlement lock poisoned").take();
        match sender {
            Some(tx) => tx.send(signal).is_ok(),
            None => false,
        }
    }
}
