use std::fmt;

/// Lifecycle of one call attempt. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    AwaitingMedia,
    OfferSent,
    AnswerPending,
    Connected,
    Closed,
}

impl NegotiationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationState::Idle => "idle",
            NegotiationState::AwaitingMedia => "awaiting-media",
            NegotiationState::OfferSent => "offer-sent",
            NegotiationState::AnswerPending => "answer-pending",
            NegotiationState::Connected => "connected",
            NegotiationState::Closed => "closed",
        }
    }

    /// A call is in progress or being set up.
    pub fn is_active(&self) -> bool {
        !matches!(self, NegotiationState::Idle | NegotiationState::Closed)
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
