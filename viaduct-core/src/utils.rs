/// Label of the single data channel carrying the remote-desktop byte
/// stream. Fixed; the answering side identifies the tunnel by it.
pub const CHANNEL_LABEL: &str = "vnc";

/// STUN server used when the caller does not supply a relay list.
pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
