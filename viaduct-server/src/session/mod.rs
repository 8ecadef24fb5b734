mod registry;
mod tunnel_session;

pub use registry::SessionRegistry;
pub use tunnel_session::{OfferError, TunnelSession};
