use std::net::SocketAddr;
use viaduct_core::RelayServer;

/// Runtime configuration for the answer side.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the signaling HTTP server listens on.
    pub listen_addr: SocketAddr,
    /// TCP address of the service behind the tunnel (the VNC server).
    pub upstream_addr: SocketAddr,
    /// Relay servers for the answering peer connection.
    pub relay_servers: Vec<RelayServer>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8080).into(),
            upstream_addr: ([127, 0, 0, 1], 5900).into(),
            relay_servers: vec![RelayServer::default_stun()],
        }
    }
}
