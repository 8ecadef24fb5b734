//! Offer-side negotiation for the viaduct tunnel: create a peer
//! connection and its single data channel, gather candidates to
//! completion, trade the offer for an answer over an HTTP signaling
//! endpoint, and hand back an open channel exactly once.

mod channel;
mod exchange;
mod negotiator;

pub use channel::VncChannel;
pub use exchange::{ExchangeFault, HttpExchange, SignalingExchange};
pub use negotiator::{CancelHandle, Negotiator, NegotiatorConfig, negotiate};
pub use viaduct_core::{NegotiationError, NegotiationPhase, RelayServer, SessionDocument};
