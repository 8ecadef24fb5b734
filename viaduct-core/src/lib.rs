mod error;
pub mod model;
pub mod utils;

pub use error::NegotiationError;
pub use model::{NegotiationPhase, RelayServer, SdpKind, SessionDocument};
