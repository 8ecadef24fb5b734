use std::fmt;

/// The phase a negotiation attempt is in. Errors carry the phase that
/// produced them so a caller can tell a signaling failure from a local
/// transport one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// ICE candidates are being gathered into the local description.
    Gathering,
    /// The finalized offer is being read back for transmission.
    Offering,
    /// The offer has been posted; the remote answer is pending.
    AwaitingAnswer,
    /// The remote answer is being applied to the peer connection.
    Applying,
    /// Waiting for the data channel to report itself open.
    Connected,
}

impl fmt::Display for NegotiationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationPhase::Gathering => "gathering",
            NegotiationPhase::Offering => "offering",
            NegotiationPhase::AwaitingAnswer => "awaiting-answer",
            NegotiationPhase::Applying => "applying",
            NegotiationPhase::Connected => "connected",
        };
        write!(f, "{name}")
    }
}
