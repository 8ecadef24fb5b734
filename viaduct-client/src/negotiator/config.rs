use std::time::Duration;
use viaduct_core::RelayServer;
use webrtc::ice_transport::ice_server::RTCIceServer;

/// Deadlines for the three points where a negotiation suspends. Each
/// one turns an unbounded hang into a phase-tagged timeout error.
#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// Bound on ICE gathering reaching completion.
    pub gathering_timeout: Duration,
    /// Bound on the HTTP offer/answer round trip.
    pub exchange_timeout: Duration,
    /// Bound on the data channel reporting itself open after the
    /// answer has been applied.
    pub open_timeout: Duration,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            gathering_timeout: Duration::from_secs(15),
            exchange_timeout: Duration::from_secs(10),
            open_timeout: Duration::from_secs(30),
        }
    }
}

/// Relay list for the peer connection. An omitted list falls back to
/// the single built-in STUN descriptor; an explicit empty list means
/// host candidates only.
pub(crate) fn ice_servers(relay_servers: Option<Vec<RelayServer>>) -> Vec<RTCIceServer> {
    relay_servers
        .unwrap_or_else(|| vec![RelayServer::default_stun()])
        .iter()
        .map(RelayServer::to_rtc)
        .collect()
}
