use crate::core::player::PlayerId;
use crate::core::round::RoundId;
use thiserror::Error;

/// Result type alias for settlement operations.
pub type Result<T> = std::result::Result<T, SettlementError>;

/// Errors returned by the settlement engine.
///
/// Every variant is a rejected operation; none of them leave a round in a
/// partially updated state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Out-of-range handicap, stroke index, score, or malformed configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A hole was evaluated before every player had a score on it.
    #[error("hole {hole} has no score for player {player}")]
    IncompleteData { hole: u8, player: PlayerId },

    /// Final settlement was attempted before every hole was scored.
    #[error("round is incomplete: hole {hole} has no score for player {player}")]
    IncompleteRound { hole: u8, player: PlayerId },

    /// The round has already been settled and is read-only.
    #[error("round {0} is already completed")]
    RoundCompleted(RoundId),
}

impl SettlementError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
