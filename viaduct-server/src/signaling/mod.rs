mod http;

pub use http::{AppState, router};
