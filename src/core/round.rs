use crate::betting::settlement::{settle_round, RoundSettlement};
use crate::betting::wager::BettingOptions;
use crate::core::course::{Course, Hole, Tee};
use crate::core::error::{Result, SettlementError};
use crate::core::player::{validate_handicap, Player, PlayerId};
use crate::core::score::Score;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Round lengths the engine supports.
pub const ROUND_LENGTHS: [u8; 2] = [9, 18];

/// Unique identifier for a round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(Uuid);

impl RoundId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    InProgress,
    /// Terminal. Balances are final and the round no longer accepts scores.
    Completed,
}

/// A round of golf being played for money.
///
/// Rounds are immutable values. Every change (a score, a closest-to-pin
/// call, moving to the next hole, completion) returns a new `Round`, so a
/// caller can recompute settlement at any point without side effects.
/// Callers must still serialize edits to a single round.
///
/// # Examples
///
/// ```
/// use golf_settlement::prelude::*;
/// use golf_settlement::simulation::random_round::standard_course;
/// use rust_decimal_macros::dec;
///
/// let course = standard_course().unwrap();
/// let players = vec![
///     Player::new(PlayerId::new("ann"), "Ann", 8).unwrap(),
///     Player::new(PlayerId::new("ben"), "Ben", 0).unwrap(),
/// ];
/// let betting = BettingOptions::new().with(Wager::match_play(dec!(5))).unwrap();
/// let round = Round::new(&course, 9, Tee::new("white"), players, betting).unwrap();
///
/// let round = round.record_score(&PlayerId::new("ann"), 1, 5).unwrap();
/// assert!(!round.is_hole_complete(1));
/// assert!(round.advance().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    id: RoundId,
    course_id: String,
    hole_count: u8,
    current_hole: u8,
    tee: Tee,
    /// Holes 1..=hole_count, in order.
    holes: Vec<Hole>,
    players: Vec<Player>,
    betting: BettingOptions,
    status: RoundStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl Round {
    /// Start a round on `course` from `tee`.
    ///
    /// Players join without scores. The course must have holes
    /// 1..=`hole_count`, each rated for `tee`.
    pub fn new(
        course: &Course,
        hole_count: u8,
        tee: Tee,
        players: Vec<Player>,
        betting: BettingOptions,
    ) -> Result<Self> {
        if !ROUND_LENGTHS.contains(&hole_count) {
            return Err(SettlementError::invalid(format!(
                "a round is 9 or 18 holes, got {}",
                hole_count
            )));
        }

        let mut holes = Vec::with_capacity(usize::from(hole_count));
        for number in 1..=hole_count {
            let hole = course.hole(number).ok_or_else(|| {
                SettlementError::invalid(format!(
                    "course {} has no hole {}",
                    course.id(),
                    number
                ))
            })?;
            hole.stroke_index(&tee)?;
            holes.push(hole.clone());
        }

        let mut seen = BTreeSet::new();
        for player in &players {
            if !seen.insert(player.id()) {
                return Err(SettlementError::invalid(format!(
                    "player {} is in the round more than once",
                    player.id()
                )));
            }
            if player.holes_played() > 0 {
                return Err(SettlementError::invalid(format!(
                    "player {} already has scores recorded",
                    player.id()
                )));
            }
        }

        let roster: Vec<PlayerId> = players.iter().map(|p| p.id().clone()).collect();
        betting.validate(&roster)?;

        Ok(Self {
            id: RoundId::new(),
            course_id: course.id().to_string(),
            hole_count,
            current_hole: 1,
            tee,
            holes,
            players,
            betting,
            status: RoundStatus::InProgress,
            completed_at: None,
        })
    }

    /// Replace the generated id (useful for testing / determinism).
    pub fn with_id(mut self, id: RoundId) -> Self {
        self.id = id;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> &RoundId {
        &self.id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn hole_count(&self) -> u8 {
        self.hole_count
    }

    pub fn current_hole(&self) -> u8 {
        self.current_hole
    }

    pub fn tee(&self) -> &Tee {
        &self.tee
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Reference data for a hole in play.
    pub fn hole(&self, number: u8) -> Result<&Hole> {
        self.holes
            .iter()
            .find(|h| h.number() == number)
            .ok_or_else(|| {
                SettlementError::invalid(format!(
                    "hole {} is not part of this {}-hole round",
                    number, self.hole_count
                ))
            })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn betting(&self) -> &BettingOptions {
        &self.betting
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == RoundStatus::Completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Re-check everything [`Round::new`] and the scoring methods
    /// guarantee. Rounds read back from JSON have not been through them.
    pub fn validate(&self) -> Result<()> {
        if !ROUND_LENGTHS.contains(&self.hole_count)
            || self.holes.len() != usize::from(self.hole_count)
        {
            return Err(SettlementError::invalid(format!(
                "round {} claims {} holes and carries {}",
                self.id,
                self.hole_count,
                self.holes.len()
            )));
        }
        if !(1..=self.hole_count).contains(&self.current_hole) {
            return Err(SettlementError::invalid(format!(
                "round {} is on hole {} of {}",
                self.id, self.current_hole, self.hole_count
            )));
        }
        if self.is_completed() != self.completed_at.is_some() {
            return Err(SettlementError::invalid(format!(
                "round {} status and completion time disagree",
                self.id
            )));
        }
        for (number, hole) in (1..=self.hole_count).zip(&self.holes) {
            if hole.number() != number {
                return Err(SettlementError::invalid(format!(
                    "round {} has hole {} in position {}",
                    self.id,
                    hole.number(),
                    number
                )));
            }
            Hole::new(hole.number(), hole.par())?
                .with_stroke_index(self.tee.clone(), hole.stroke_index(&self.tee)?)?;
        }

        let mut seen = BTreeSet::new();
        for player in &self.players {
            if !seen.insert(player.id()) {
                return Err(SettlementError::invalid(format!(
                    "player {} is in the round more than once",
                    player.id()
                )));
            }
            validate_handicap(player.handicap())?;

            let mut scored = 0;
            for hole in &self.holes {
                let Some(score) = player.score(hole.number()) else {
                    continue;
                };
                let expected =
                    Score::compute(hole, &self.tee, score.gross(), player.handicap())?
                        .with_closest_to_pin(score.closest_to_pin());
                if *score != expected || (score.closest_to_pin() && hole.par() != 3) {
                    return Err(SettlementError::invalid(format!(
                        "player {} has an inconsistent score on hole {}",
                        player.id(),
                        hole.number()
                    )));
                }
                scored += 1;
            }
            if scored != player.holes_played() {
                return Err(SettlementError::invalid(format!(
                    "player {} has scores outside holes 1..={}",
                    player.id(),
                    self.hole_count
                )));
            }
        }

        let roster: Vec<PlayerId> = self.players.iter().map(|p| p.id().clone()).collect();
        self.betting.validate(&roster)
    }

    // --- Scoring ---

    /// Record `gross` strokes for `player` on `hole`, replacing any earlier
    /// entry for that hole.
    pub fn record_score(&self, player: &PlayerId, hole: u8, gross: u8) -> Result<Self> {
        self.ensure_in_progress()?;
        let index = self.player_index(player)?;
        let current = &self.players[index];
        let closest = current
            .score(hole)
            .map(Score::closest_to_pin)
            .unwrap_or(false);
        let score = Score::compute(self.hole(hole)?, &self.tee, gross, current.handicap())?
            .with_closest_to_pin(closest);

        debug!(
            "round {}: {} scored {} (net {}) on hole {}",
            self.id,
            player,
            score.gross(),
            score.net(),
            hole
        );

        let mut next = self.clone();
        next.players[index] = current.with_score(score);
        Ok(next)
    }

    /// Award closest to the pin on a par 3. Only one player holds it per
    /// hole, so any earlier award on that hole is cleared.
    pub fn mark_closest_to_pin(&self, hole: u8, player: &PlayerId) -> Result<Self> {
        self.ensure_in_progress()?;
        let par = self.hole(hole)?.par();
        if par != 3 {
            return Err(SettlementError::invalid(format!(
                "closest to the pin is only played on par 3s, hole {} is a par {}",
                hole, par
            )));
        }
        let index = self.player_index(player)?;
        if self.players[index].score(hole).is_none() {
            return Err(SettlementError::IncompleteData {
                hole,
                player: player.clone(),
            });
        }

        let mut next = self.clone();
        for p in next.players.iter_mut() {
            let updated = p
                .score(hole)
                .map(|s| s.clone().with_closest_to_pin(p.id() == player));
            if let Some(score) = updated {
                *p = p.with_score(score);
            }
        }
        Ok(next)
    }

    /// Every player has a score on `hole`.
    pub fn is_hole_complete(&self, hole: u8) -> bool {
        self.players.iter().all(|p| p.score(hole).is_some())
    }

    /// First (hole, player) without a score, scanning holes in order.
    pub fn first_missing_score(&self) -> Option<(u8, &PlayerId)> {
        (1..=self.hole_count).find_map(|hole| {
            self.players
                .iter()
                .find(|p| p.score(hole).is_none())
                .map(|p| (hole, p.id()))
        })
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing_score().is_none()
    }

    /// Move to the next hole. The current hole must be fully scored; on the
    /// last hole the pointer stays put.
    pub fn advance(&self) -> Result<Self> {
        self.ensure_in_progress()?;
        let hole = self.current_hole;
        if let Some(missing) = self.players.iter().find(|p| p.score(hole).is_none()) {
            return Err(SettlementError::IncompleteData {
                hole,
                player: missing.id().clone(),
            });
        }
        let mut next = self.clone();
        next.current_hole = (hole + 1).min(self.hole_count);
        Ok(next)
    }

    /// Settle the round once and close it.
    ///
    /// Returns the completed round, with each player's balance stamped, and
    /// the settlement it was closed with.
    pub fn complete(&self, at: DateTime<Utc>) -> Result<(Self, RoundSettlement)> {
        self.ensure_in_progress()?;
        let settlement = settle_round(self)?;

        let mut next = self.clone();
        next.players = self
            .players
            .iter()
            .map(|p| p.with_balance(settlement.balance(p.id())))
            .collect();
        next.status = RoundStatus::Completed;
        next.current_hole = self.hole_count;
        next.completed_at = Some(at);

        info!(
            "round {} completed: {} players, {} changing hands",
            self.id,
            self.players.len(),
            settlement.ledger().total_won()
        );
        Ok((next, settlement))
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.is_completed() {
            return Err(SettlementError::RoundCompleted(self.id.clone()));
        }
        Ok(())
    }

    fn player_index(&self, id: &PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| SettlementError::invalid(format!("unknown player {}", id)))
    }
}
