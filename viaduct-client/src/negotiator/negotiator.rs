use crate::channel::VncChannel;
use crate::exchange::{HttpExchange, SignalingExchange};
use crate::negotiator::cancel::CancelHandle;
use crate::negotiator::config::{NegotiatorConfig, ice_servers};
use crate::negotiator::settlement::{SettleSignal, Settlement};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use viaduct_core::utils::CHANNEL_LABEL;
use viaduct_core::{NegotiationError, NegotiationPhase, RelayServer, SdpKind, SessionDocument};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Drives one complete negotiation attempt: peer connection and data
/// channel up front, offer finalized through ICE gathering, one HTTP
/// exchange, answer applied, channel open. The result settles exactly
/// once; every phase failure surfaces as a phase-tagged error.
///
/// One-shot by design: a `Negotiator` performs a single attempt per
/// `negotiate` call and never renegotiates.
pub struct Negotiator {
    config: NegotiatorConfig,
    exchange: Arc<dyn SignalingExchange>,
    cancel: CancelHandle,
}

/// Negotiate with default configuration over plain HTTP.
pub async fn negotiate(
    signaling_url: &str,
    relay_servers: Option<Vec<RelayServer>>,
) -> Result<VncChannel, NegotiationError> {
    Negotiator::new(NegotiatorConfig::default())
        .negotiate(signaling_url, relay_servers)
        .await
}

impl Negotiator {
    pub fn new(config: NegotiatorConfig) -> Self {
        Self::with_exchange(config, Arc::new(HttpExchange::new()))
    }

    /// Substitute the signaling transport; tests use this to script the
    /// offer/answer exchange.
    pub fn with_exchange(config: NegotiatorConfig, exchange: Arc<dyn SignalingExchange>) -> Self {
        Self {
            config,
            exchange,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle for aborting the attempt from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn negotiate(
        &self,
        signaling_url: &str,
        relay_servers: Option<Vec<RelayServer>>,
    ) -> Result<VncChannel, NegotiationError> {
        let api = build_api()
            .map_err(|e| NegotiationError::transport(NegotiationPhase::Gathering, e))?;

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers(relay_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| NegotiationError::transport(NegotiationPhase::Gathering, e))?,
        );

        match self.drive(&peer_connection, signaling_url).await {
            Ok(channel) => Ok(channel),
            Err(err) => {
                // Failed attempts must not leak a half-negotiated transport.
                if let Err(close_err) = peer_connection.close().await {
                    warn!("failed to close peer connection after error: {close_err}");
                }
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        pc: &Arc<RTCPeerConnection>,
        signaling_url: &str,
    ) -> Result<VncChannel, NegotiationError> {
        use NegotiationPhase::*;

        let (settlement, settled_rx) = Settlement::new();
        let settlement = Arc::new(settlement);

        // The channel is created before any negotiation step so its SCTP
        // transport is part of the offer. Ordered and reliable: the
        // remote-desktop protocol assumes a byte stream.
        let init = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };
        let data_channel = pc
            .create_data_channel(CHANNEL_LABEL, Some(init))
            .await
            .map_err(|e| NegotiationError::transport(Gathering, e))?;

        // Both terminal observers feed the same one-shot guard; whichever
        // fires first settles the attempt. Channel-open may race ahead of
        // remote-description application, both orders are fine.
        let open_settlement = settlement.clone();
        data_channel.on_open(Box::new(move || {
            let settlement = open_settlement.clone();
            Box::pin(async move {
                debug!("data channel reported open");
                settlement.settle(SettleSignal::ChannelOpen);
            })
        }));

        let state_settlement = settlement.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let settlement = state_settlement.clone();
            Box::pin(async move {
                debug!("peer connection state: {state}");
                if matches!(
                    state,
                    RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed
                ) {
                    settlement.settle(SettleSignal::TransportFailed(state));
                }
            })
        }));

        // Constructed before any remote bytes can flow: the channel
        // registers its inbound handler here, so a remote that speaks
        // the moment the channel opens is buffered rather than dropped.
        let channel = VncChannel::new(pc.clone(), data_channel.clone());

        let offer = pc
            .create_offer(None)
            .await
            .map_err(|e| NegotiationError::transport(Gathering, e))?;
        let mut gathering_done = pc.gathering_complete_promise().await;
        pc.set_local_description(offer)
            .await
            .map_err(|e| NegotiationError::transport(Gathering, e))?;

        // Single-shot signaling: every candidate rides inside the offer,
        // so the exchange must not start until gathering completes.
        self.bounded(Gathering, self.config.gathering_timeout, gathering_done.recv())
            .await?;

        let local = pc.local_description().await.ok_or_else(|| {
            NegotiationError::transport(Offering, "local description missing after gathering")
        })?;
        let offer_doc = SessionDocument::offer(local.sdp);
        info!("offer finalized, exchanging with {signaling_url}");

        let answer_doc = self
            .bounded(
                AwaitingAnswer,
                self.config.exchange_timeout,
                self.exchange.exchange(signaling_url, &offer_doc),
            )
            .await?
            .map_err(|fault| NegotiationError::Signaling {
                phase: AwaitingAnswer,
                reason: fault.to_string(),
            })?;

        if answer_doc.kind != SdpKind::Answer {
            return Err(NegotiationError::rejected_description(format!(
                "expected an answer document, got {}",
                answer_doc.kind
            )));
        }

        let answer = RTCSessionDescription::answer(answer_doc.sdp)
            .map_err(|e| NegotiationError::rejected_description(e.to_string()))?;
        pc.set_remote_description(answer)
            .await
            .map_err(|e| NegotiationError::rejected_description(e.to_string()))?;
        debug!("remote description applied, waiting for channel open");

        match self
            .bounded(Connected, self.config.open_timeout, settled_rx)
            .await?
        {
            Ok(SettleSignal::ChannelOpen) => {
                info!("tunnel channel '{}' open", data_channel.label());
                Ok(channel)
            }
            Ok(SettleSignal::TransportFailed(state)) => Err(NegotiationError::transport(
                Connected,
                format!("peer connection entered {state}"),
            )),
            Err(_) => Err(NegotiationError::transport(
                Connected,
                "settlement guard dropped",
            )),
        }
    }

    /// Run one suspension point under its deadline and the cancel handle.
    async fn bounded<T>(
        &self,
        phase: NegotiationPhase,
        limit: Duration,
        fut: impl Future<Output = T>,
    ) -> Result<T, NegotiationError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(NegotiationError::Cancelled { phase }),
            out = tokio::time::timeout(limit, fut) => {
                out.map_err(|_| NegotiationError::Timeout { phase })
            }
        }
    }
}

fn build_api() -> webrtc::error::Result<API> {
    let mut media_engine = MediaEngine::default();
    media_engine.register_default_codecs()?;
    let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;
    Ok(APIBuilder::new()
        .with_media_engine(media_engine)
        .with_interceptor_registry(registry)
        .build())
}
