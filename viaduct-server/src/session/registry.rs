use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;
use webrtc::peer_connection::RTCPeerConnection;

/// Live tunnel sessions. Sessions insert themselves when opened and
/// release themselves once their peer connection dies; `close_all`
/// tears the rest down on shutdown.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<RTCPeerConnection>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub(crate) fn insert(&self, id: Uuid, peer_connection: Arc<RTCPeerConnection>) {
        self.sessions.insert(id, peer_connection);
    }

    /// Drop a session and close its peer connection in the background.
    pub(crate) fn release(&self, id: Uuid) {
        let Some((_, peer_connection)) = self.sessions.remove(&id) else {
            return;
        };
        debug!("releasing session {id}");
        tokio::spawn(async move {
            if let Err(e) = peer_connection.close().await {
                warn!("failed to close peer connection for session {id}: {e}");
            }
        });
    }

    pub async fn close_all(&self) {
        let ids: Vec<Uuid> = self.sessions.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, peer_connection)) = self.sessions.remove(&id) {
                if let Err(e) = peer_connection.close().await {
                    warn!("failed to close peer connection for session {id}: {e}");
                }
            }
        }
    }
}
