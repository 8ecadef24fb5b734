use anyhow::{Context, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use viaduct_core::SessionDocument;
use viaduct_core::utils::CHANNEL_LABEL;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Offer-side counterpart for exercising the answering server: creates
/// the tunnel data channel, produces a finalized (fully gathered)
/// offer, and applies the server's answer. No relay servers; tests run
/// on local candidates.
pub struct OfferPeer {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<RTCDataChannel>,
    open_rx: Mutex<mpsc::Receiver<()>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<Bytes>>,
}

impl OfferPeer {
    pub async fn new() -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;
        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(
            api.new_peer_connection(RTCConfiguration::default())
                .await
                .context("failed to create peer connection")?,
        );

        let init = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };
        let data_channel = peer_connection
            .create_data_channel(CHANNEL_LABEL, Some(init))
            .await
            .context("failed to create data channel")?;

        let (open_tx, open_rx) = mpsc::channel(1);
        data_channel.on_open(Box::new(move || {
            Box::pin(async move {
                let _ = open_tx.send(()).await;
            })
        }));

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        data_channel.on_message(Box::new(move |msg: DataChannelMessage| {
            let inbound_tx = inbound_tx.clone();
            Box::pin(async move {
                let _ = inbound_tx.send(Bytes::from(msg.data.to_vec()));
            })
        }));

        Ok(Self {
            peer_connection,
            data_channel,
            open_rx: Mutex::new(open_rx),
            inbound_rx: Mutex::new(inbound_rx),
        })
    }

    /// Offer with gathering run to completion, as the real offer side
    /// sends it.
    pub async fn finalized_offer(&self) -> Result<SessionDocument> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("failed to create offer")?;
        let mut gathering_done = self.peer_connection.gathering_complete_promise().await;
        self.peer_connection
            .set_local_description(offer)
            .await
            .context("failed to set local description")?;

        tokio::time::timeout(Duration::from_secs(10), gathering_done.recv())
            .await
            .context("ICE gathering timed out")?;

        let local = self
            .peer_connection
            .local_description()
            .await
            .context("local description missing")?;
        Ok(SessionDocument::offer(local.sdp))
    }

    pub async fn apply_answer(&self, answer: SessionDocument) -> Result<()> {
        let sd = RTCSessionDescription::answer(answer.sdp)
            .context("answer SDP failed to parse")?;
        self.peer_connection
            .set_remote_description(sd)
            .await
            .context("failed to set remote description")?;
        Ok(())
    }

    pub async fn wait_open(&self, timeout: Duration) -> Result<()> {
        let mut open_rx = self.open_rx.lock().await;
        tokio::time::timeout(timeout, open_rx.recv())
            .await
            .context("timed out waiting for data channel open")?
            .context("open channel dropped")?;
        Ok(())
    }

    pub async fn send(&self, data: &[u8]) -> Result<()> {
        self.data_channel
            .send(&Bytes::copy_from_slice(data))
            .await
            .context("failed to send over data channel")?;
        Ok(())
    }

    pub async fn recv(&self, timeout: Duration) -> Result<Bytes> {
        let mut inbound_rx = self.inbound_rx.lock().await;
        tokio::time::timeout(timeout, inbound_rx.recv())
            .await
            .context("timed out waiting for inbound message")?
            .context("inbound channel dropped")
    }

    /// Close only the data channel, leaving the peer connection up.
    pub async fn close_channel(&self) -> Result<()> {
        self.data_channel
            .close()
            .await
            .context("failed to close data channel")?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection
            .close()
            .await
            .context("failed to close peer connection")?;
        Ok(())
    }
}
