use crate::core::error::{Result, SettlementError};
use crate::core::score::Score;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Highest handicap the engine accepts.
pub const MAX_HANDICAP: u8 = 54;

/// Unique identifier for a player in a round.
///
/// # Examples
///
/// ```
/// use golf_settlement::core::player::PlayerId;
///
/// let alice = PlayerId::new("alice");
/// let bob = PlayerId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Check that a handicap lies in `0..=MAX_HANDICAP`.
pub fn validate_handicap(handicap: u8) -> Result<()> {
    if handicap > MAX_HANDICAP {
        return Err(SettlementError::invalid(format!(
            "handicap {} is outside 0..={}",
            handicap, MAX_HANDICAP
        )));
    }
    Ok(())
}

/// A player in a round together with the scores recorded so far.
///
/// Players are value records: recording a score produces a new `Player`
/// rather than mutating the existing one. Scores are keyed by hole number,
/// so re-entering a hole replaces the earlier score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    handicap: u8,
    scores: BTreeMap<u8, Score>,
    /// Money won (positive) or lost (negative). Stamped on round completion.
    balance: Decimal,
}

impl Player {
    /// Create a player with no scores.
    pub fn new(id: PlayerId, name: impl Into<String>, handicap: u8) -> Result<Self> {
        validate_handicap(handicap)?;
        Ok(Self {
            id,
            name: name.into(),
            handicap,
            scores: BTreeMap::new(),
            balance: Decimal::ZERO,
        })
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handicap(&self) -> u8 {
        self.handicap
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// The score recorded for `hole`, if any.
    pub fn score(&self, hole: u8) -> Option<&Score> {
        self.scores.get(&hole)
    }

    /// Recorded scores in hole order.
    pub fn scores(&self) -> impl Iterator<Item = &Score> {
        self.scores.values()
    }

    pub fn holes_played(&self) -> usize {
        self.scores.len()
    }

    pub fn gross_total(&self) -> u32 {
        self.scores.values().map(|s| u32::from(s.gross())).sum()
    }

    pub fn net_total(&self) -> u32 {
        self.scores.values().map(|s| u32::from(s.net())).sum()
    }

    /// Returns a copy of this player with `score` stored under its hole,
    /// replacing any earlier entry for that hole.
    pub fn with_score(&self, score: Score) -> Self {
        let mut next = self.clone();
        next.scores.insert(score.hole(), score);
        next
    }

    pub(crate) fn with_balance(&self, balance: Decimal) -> Self {
        let mut next = self.clone();
        next.balance = balance;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::course::{Hole, Tee};

    fn hole(number: u8, par: u8, index: u8) -> Hole {
        Hole::new(number, par)
            .unwrap()
            .with_stroke_index(Tee::new("white"), index)
            .unwrap()
    }

    #[test]
    fn test_player_id_equality() {
        assert_eq!(PlayerId::new("alice"), PlayerId::from("alice"));
        assert_ne!(PlayerId::new("alice"), PlayerId::new("bob"));
        assert!(PlayerId::new("alice") < PlayerId::new("bob"));
    }

    #[test]
    fn test_handicap_range() {
        assert!(Player::new(PlayerId::new("a"), "A", 0).is_ok());
        assert!(Player::new(PlayerId::new("a"), "A", 54).is_ok());
        assert!(matches!(
            Player::new(PlayerId::new("a"), "A", 55),
            Err(SettlementError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rescoring_replaces() {
        let tee = Tee::new("white");
        let h1 = hole(1, 4, 5);
        let player = Player::new(PlayerId::new("a"), "A", 10).unwrap();

        let player = player.with_score(Score::compute(&h1, &tee, 6, 10).unwrap());
        let player = player.with_score(Score::compute(&h1, &tee, 4, 10).unwrap());

        assert_eq!(player.holes_played(), 1);
        assert_eq!(player.gross_total(), 4);
        assert_eq!(player.net_total(), 3);
    }

    #[test]
    fn test_totals_across_holes() {
        let tee = Tee::new("white");
        let player = Player::new(PlayerId::new("a"), "A", 0)
            .unwrap()
            .with_score(Score::compute(&hole(1, 4, 1), &tee, 5, 0).unwrap())
            .with_score(Score::compute(&hole(2, 3, 2), &tee, 3, 0).unwrap());
        assert_eq!(player.gross_total(), 8);
        assert_eq!(player.net_total(), 8);
        assert_eq!(player.balance(), Decimal::ZERO);
    }
}
