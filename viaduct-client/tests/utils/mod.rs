pub mod exchanges;

pub use echo_upstream::*;
pub use exchanges::*;
