use crate::model::NegotiationPhase;
use thiserror::Error;

/// Everything that can go wrong during one negotiation attempt. Every
/// phase failure funnels into exactly one of these variants; a caller
/// never observes a silent failure or an indefinite hang.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The HTTP signaling exchange failed: unreachable endpoint,
    /// non-2xx status, or a body that is not a session document.
    #[error("signaling exchange failed during {phase}: {reason}")]
    Signaling {
        phase: NegotiationPhase,
        reason: String,
    },

    /// The remote session description was rejected by the local peer
    /// connection (malformed or incompatible SDP).
    #[error("remote description rejected: {reason}")]
    DescriptionApplication { reason: String },

    /// A suspension point exceeded its configured deadline.
    #[error("negotiation timed out during {phase}")]
    Timeout { phase: NegotiationPhase },

    /// The caller aborted the attempt through its cancel handle.
    #[error("negotiation cancelled during {phase}")]
    Cancelled { phase: NegotiationPhase },

    /// The local transport stack failed.
    #[error("transport failure during {phase}: {reason}")]
    Transport {
        phase: NegotiationPhase,
        reason: String,
    },
}

impl NegotiationError {
    pub fn transport(phase: NegotiationPhase, source: impl std::fmt::Display) -> Self {
        Self::Transport {
            phase,
            reason: source.to_string(),
        }
    }

    pub fn rejected_description(reason: impl Into<String>) -> Self {
        Self::DescriptionApplication {
            reason: reason.into(),
        }
    }
}
