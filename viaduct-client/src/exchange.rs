use async_trait::async_trait;
use reqwest::header;
use thiserror::Error;
use viaduct_core::SessionDocument;

/// The offer/answer leg of a negotiation: ship one finalized offer to
/// the signaling endpoint, get one answer back. Production code goes
/// through [`HttpExchange`]; tests substitute their own implementation.
#[async_trait]
pub trait SignalingExchange: Send + Sync {
    async fn exchange(
        &self,
        url: &str,
        offer: &SessionDocument,
    ) -> Result<SessionDocument, ExchangeFault>;
}

#[derive(Debug, Error)]
pub enum ExchangeFault {
    #[error("request failed: {0}")]
    Request(String),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("response body is not a session document: {0}")]
    Body(String),
}

/// POSTs the offer as JSON and parses the JSON answer. One request per
/// negotiation, issued only after ICE gathering has completed.
pub struct HttpExchange {
    client: reqwest::Client,
}

impl HttpExchange {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingExchange for HttpExchange {
    async fn exchange(
        &self,
        url: &str,
        offer: &SessionDocument,
    ) -> Result<SessionDocument, ExchangeFault> {
        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(offer)
            .send()
            .await
            .map_err(|e| ExchangeFault::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeFault::Status(status.as_u16()));
        }

        response
            .json::<SessionDocument>()
            .await
            .map_err(|e| ExchangeFault::Body(e.to_string()))
    }
}
