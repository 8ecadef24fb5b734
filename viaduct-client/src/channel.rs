use bytes::Bytes;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use viaduct_core::{SdpKind, SessionDocument};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;

/// The artifact a successful negotiation yields: an open, ordered,
/// reliable byte-stream channel. Holds the peer connection so the
/// transport stays alive for as long as the channel does.
pub struct VncChannel {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<RTCDataChannel>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
}

impl std::fmt::Debug for VncChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VncChannel")
            .field("label", &self.data_channel.label())
            .finish_non_exhaustive()
    }
}

impl VncChannel {
    /// Registers the inbound handler up front: the remote side may
    /// speak first (an RFB server greets immediately), and any bytes it
    /// sends before the caller subscribes must be buffered, not lost.
    pub(crate) fn new(
        peer_connection: Arc<RTCPeerConnection>,
        data_channel: Arc<RTCDataChannel>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        data_channel.on_message(Box::new(move |msg: DataChannelMessage| {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(Bytes::from(msg.data.to_vec()));
            })
        }));

        Self {
            peer_connection,
            data_channel,
            inbound: Mutex::new(Some(rx)),
        }
    }

    pub fn label(&self) -> &str {
        self.data_channel.label()
    }

    /// Write one chunk of the remote-desktop byte stream.
    pub async fn send(&self, data: &Bytes) -> Result<usize, webrtc::Error> {
        self.data_channel.send(data).await
    }

    /// Take the inbound byte stream. Buffering started when the channel
    /// was constructed, so bytes that arrived before this call are
    /// waiting in the receiver. Single consumer; `None` once taken.
    pub fn subscribe(&self) -> Option<mpsc::UnboundedReceiver<Bytes>> {
        self.inbound.lock().expect("inbound lock poisoned").take()
    }

    /// The answer document currently applied to the underlying peer
    /// connection, if any.
    pub async fn remote_description(&self) -> Option<SessionDocument> {
        let sd = self.peer_connection.remote_description().await?;
        let kind = match sd.sdp_type {
            RTCSdpType::Offer => SdpKind::Offer,
            RTCSdpType::Answer => SdpKind::Answer,
            _ => return None,
        };
        Some(SessionDocument { kind, sdp: sd.sdp })
    }

    /// Tear down the channel and its peer connection.
    pub async fn close(&self) -> Result<(), webrtc::Error> {
        self.peer_connection.close().await
    }
}
