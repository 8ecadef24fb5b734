use crate::config::ServerConfig;
use crate::session::SessionRegistry;
use crate::upstream;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::info;
use uuid::Uuid;
use viaduct_core::{RelayServer, SessionDocument};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Bound on answer-side ICE gathering; the whole answer is produced
/// within one HTTP request, so it cannot wait forever.
const GATHERING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("document is not an SDP offer")]
    NotAnOffer,

    #[error("malformed SDP: {0}")]
    MalformedSdp(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// One accepted tunnel: an answering peer connection whose incoming
/// data channel is bridged to the upstream TCP service.
pub struct TunnelSession {
    id: Uuid,
    peer_connection: Arc<RTCPeerConnection>,
}

impl TunnelSession {
    /// Create the answering peer connection, register the bridge and
    /// lifecycle callbacks, and enroll the session in the registry.
    pub async fn open(config: &ServerConfig, registry: SessionRegistry) -> Result<Self> {
        let id = Uuid::new_v4();
        let api = build_api()?;

        let rtc_config = RTCConfiguration {
            ice_servers: config.relay_servers.iter().map(RelayServer::to_rtc).collect(),
            ..Default::default()
        };
        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("failed to create peer connection")?,
        );

        // The offer side owns channel creation; we take whatever channel
        // arrives and splice it onto the upstream socket.
        let upstream_addr = config.upstream_addr;
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            Box::pin(async move {
                info!("session {id}: data channel '{}' announced", dc.label());
                upstream::attach(dc, upstream_addr).await;
            })
        }));

        let lifecycle_registry = registry.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let registry = lifecycle_registry.clone();
                Box::pin(async move {
                    info!("session {id}: peer connection state {state}");
                    match state {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => registry.release(id),
                        _ => {}
                    }
                })
            },
        ));

        registry.insert(id, peer_connection.clone());

        Ok(Self {
            id,
            peer_connection,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Apply the remote offer and produce the finalized local answer.
    ///
    /// Gathering runs to completion before returning: the exchange is
    /// single-shot, so every candidate must ride inside the answer.
    pub async fn answer_offer(&self, offer: SessionDocument) -> Result<SessionDocument, OfferError> {
        if !offer.is_offer() {
            return Err(OfferError::NotAnOffer);
        }

        let remote = RTCSessionDescription::offer(offer.sdp)
            .map_err(|e| OfferError::MalformedSdp(e.to_string()))?;
        self.peer_connection
            .set_remote_description(remote)
            .await
            .map_err(|e| OfferError::MalformedSdp(e.to_string()))?;

        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        let mut gathering_done = self.peer_connection.gathering_complete_promise().await;
        self.peer_connection
            .set_local_description(answer)
            .await
            .context("failed to set local description")?;

        timeout(GATHERING_TIMEOUT, gathering_done.recv())
            .await
            .map_err(|_| anyhow::anyhow!("ICE gathering timed out"))
            .map_err(OfferError::Internal)?;

        let local = self
            .peer_connection
            .local_description()
            .await
            .context("local description missing after gathering")?;

        info!("session {}: answer finalized", self.id);
        Ok(SessionDocument::answer(local.sdp))
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection
            .close()
            .await
            .context("failed to close peer connection")?;
        Ok(())
    }
}

fn build_api() -> Result<webrtc::api::API> {
    let mut media_engine = MediaEngine::default();
    media_engine
        .register_default_codecs()
        .context("failed to register codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut media_engine)
        .context("failed to register interceptors")?;
    Ok(APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build())
}
