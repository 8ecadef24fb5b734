mod phase;
mod relay;
mod session;

pub use phase::NegotiationPhase;
pub use relay::RelayServer;
pub use session::{SdpKind, SessionDocument};
