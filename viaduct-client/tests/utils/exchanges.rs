use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::sync::mpsc;
use viaduct_client::{ExchangeFault, SignalingExchange};
use viaduct_core::{RelayServer, SessionDocument};
use viaduct_server::{ServerConfig, SessionRegistry, TunnelSession};

type Script = Box<dyn Fn(&SessionDocument) -> Result<SessionDocument, ExchangeFault> + Send + Sync>;

/// Signaling exchange driven by a closure; records every offer it is
/// handed so tests can assert how often and with what it was called.
pub struct ScriptedExchange {
    script: Script,
    offers: Mutex<Vec<SessionDocument>>,
}

impl ScriptedExchange {
    pub fn new(
        script: impl Fn(&SessionDocument) -> Result<SessionDocument, ExchangeFault>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            offers: Mutex::new(Vec::new()),
        }
    }

    pub fn offers(&self) -> Vec<SessionDocument> {
        self.offers.lock().expect("offers lock").clone()
    }
}

#[async_trait]
impl SignalingExchange for ScriptedExchange {
    async fn exchange(
        &self,
        _url: &str,
        offer: &SessionDocument,
    ) -> Result<SessionDocument, ExchangeFault> {
        self.offers.lock().expect("offers lock").push(offer.clone());
        (self.script)(offer)
    }
}

/// Exchange that never resolves, holding a negotiation at the
/// awaiting-answer suspension point. Signals once it has been reached
/// so tests can act mid-flight.
pub struct StalledExchange {
    reached: mpsc::UnboundedSender<()>,
}

impl StalledExchange {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (reached, reached_rx) = mpsc::unbounded_channel();
        (Self { reached }, reached_rx)
    }
}

#[async_trait]
impl SignalingExchange for StalledExchange {
    async fn exchange(
        &self,
        _url: &str,
        _offer: &SessionDocument,
    ) -> Result<SessionDocument, ExchangeFault> {
        let _ = self.reached.send(());
        std::future::pending().await
    }
}

/// Exchange backed by a real in-process answering session: the offer
/// goes straight into a `TunnelSession` and its finalized answer comes
/// back, skipping HTTP entirely.
pub struct LoopbackExchange {
    config: ServerConfig,
    registry: SessionRegistry,
    offers: Mutex<Vec<SessionDocument>>,
    answers: Mutex<Vec<SessionDocument>>,
}

impl LoopbackExchange {
    pub fn new(upstream_addr: SocketAddr) -> Self {
        Self {
            config: ServerConfig {
                upstream_addr,
                relay_servers: Vec::<RelayServer>::new(),
                ..Default::default()
            },
            registry: SessionRegistry::new(),
            offers: Mutex::new(Vec::new()),
            answers: Mutex::new(Vec::new()),
        }
    }

    pub fn offers(&self) -> Vec<SessionDocument> {
        self.offers.lock().expect("offers lock").clone()
    }

    pub fn answers(&self) -> Vec<SessionDocument> {
        self.answers.lock().expect("answers lock").clone()
    }
}

#[async_trait]
impl SignalingExchange for LoopbackExchange {
    async fn exchange(
        &self,
        _url: &str,
        offer: &SessionDocument,
    ) -> Result<SessionDocument, ExchangeFault> {
        self.offers.lock().expect("offers lock").push(offer.clone());

        let session = TunnelSession::open(&self.config, self.registry.clone())
            .await
            .map_err(|e| ExchangeFault::Request(e.to_string()))?;
        let answer = session
            .answer_offer(offer.clone())
            .await
            .map_err(|e| ExchangeFault::Body(e.to_string()))?;

        self.answers
            .lock()
            .expect("answers lock")
            .push(answer.clone());
        Ok(answer)
    }
}
