pub use viaduct_core::{NegotiationError, NegotiationPhase};

pub mod model {
    pub use viaduct_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use viaduct_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use viaduct_client::*;
}
