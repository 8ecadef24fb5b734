mod cancel;
mod config;
mod negotiator;
mod settlement;

pub use cancel::CancelHandle;
pub use config::NegotiatorConfig;
pub use negotiator::{Negotiator, negotiate};
