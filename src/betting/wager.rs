//! Wager formats and the per-round betting configuration.
//!
//! Each format is a variant of [`Wager`] and settles one hole at a time
//! through [`Wager::evaluate`]. Every evaluation is zero-sum: the deltas it
//! returns for a hole add up to exactly zero.

use crate::core::error::{Result, SettlementError};
use crate::core::player::PlayerId;
use crate::core::score::Score;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Money is settled in cents.
pub const MONEY_SCALE: u32 = 2;

/// Largest stake a single wager may carry. Keeps every per-hole product
/// (stake times opponents times carried skins) far inside `Decimal` range.
pub const MAX_STAKE: Decimal = dec!(1_000_000);

/// Signed money movement per player for one hole and one format.
pub type Deltas = BTreeMap<PlayerId, Decimal>;

/// The kind of a wager, used as a key in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerFormat {
    StrokePlay,
    MatchPlay,
    Skins,
    BirdieBonus,
    ClosestToPin,
}

impl WagerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagerFormat::StrokePlay => "stroke_play",
            WagerFormat::MatchPlay => "match_play",
            WagerFormat::Skins => "skins",
            WagerFormat::BirdieBonus => "birdie_bonus",
            WagerFormat::ClosestToPin => "closest_to_pin",
        }
    }
}

impl fmt::Display for WagerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WagerFormat {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stroke_play" => Ok(WagerFormat::StrokePlay),
            "match_play" => Ok(WagerFormat::MatchPlay),
            "skins" => Ok(WagerFormat::Skins),
            "birdie_bonus" => Ok(WagerFormat::BirdieBonus),
            "closest_to_pin" => Ok(WagerFormat::ClosestToPin),
            other => Err(SettlementError::invalid(format!(
                "unknown wager format: {}",
                other
            ))),
        }
    }
}

/// How stroke play treats a tie for the low score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Tied winners share the pot evenly.
    #[default]
    Split,
    /// Any tie for low means nobody wins the hole.
    Push,
}

/// Who plays whom in match play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPlayMode {
    /// Every pair of players is its own match.
    #[default]
    Pairwise,
    /// Two sides, best ball. Sides must be the same size.
    Teams {
        team_a: Vec<PlayerId>,
        team_b: Vec<PlayerId>,
    },
}

fn default_carryover() -> bool {
    true
}

/// A wager format together with its stake.
///
/// # Examples
///
/// ```
/// use golf_settlement::betting::wager::{Wager, WagerFormat};
///
/// let json = r#"{ "format": "skins", "stake": "2.50" }"#;
/// let wager: Wager = serde_json::from_str(json).unwrap();
/// assert_eq!(wager.format(), WagerFormat::Skins);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Wager {
    StrokePlay {
        stake: Decimal,
        #[serde(default)]
        ties: TiePolicy,
    },
    MatchPlay {
        stake: Decimal,
        #[serde(default)]
        mode: MatchPlayMode,
    },
    Skins {
        stake: Decimal,
        #[serde(default = "default_carryover")]
        carryover: bool,
    },
    BirdieBonus {
        stake: Decimal,
    },
    ClosestToPin {
        stake: Decimal,
    },
}

/// One player's recorded score on the hole being settled.
#[derive(Debug, Clone, Copy)]
pub struct HoleEntry<'a> {
    pub player: &'a PlayerId,
    pub score: &'a Score,
}

/// Hole-level facts a wager may need beyond the players' scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleContext {
    pub par: u8,
    /// Skins carried into this hole from earlier tied holes.
    pub skins_carry: u32,
}

impl Wager {
    pub fn stroke_play(stake: Decimal) -> Self {
        Wager::StrokePlay {
            stake,
            ties: TiePolicy::default(),
        }
    }

    pub fn match_play(stake: Decimal) -> Self {
        Wager::MatchPlay {
            stake,
            mode: MatchPlayMode::default(),
        }
    }

    pub fn skins(stake: Decimal) -> Self {
        Wager::Skins {
            stake,
            carryover: true,
        }
    }

    pub fn format(&self) -> WagerFormat {
        match self {
            Wager::StrokePlay { .. } => WagerFormat::StrokePlay,
            Wager::MatchPlay { .. } => WagerFormat::MatchPlay,
            Wager::Skins { .. } => WagerFormat::Skins,
            Wager::BirdieBonus { .. } => WagerFormat::BirdieBonus,
            Wager::ClosestToPin { .. } => WagerFormat::ClosestToPin,
        }
    }

    pub fn stake(&self) -> Decimal {
        match self {
            Wager::StrokePlay { stake, .. }
            | Wager::MatchPlay { stake, .. }
            | Wager::Skins { stake, .. }
            | Wager::BirdieBonus { stake }
            | Wager::ClosestToPin { stake } => *stake,
        }
    }

    /// Settle this wager for one hole.
    ///
    /// Every entry appears in the result, with zero when the player neither
    /// won nor lost.
    pub fn evaluate(&self, entries: &[HoleEntry<'_>], context: &HoleContext) -> Deltas {
        let mut deltas: Deltas = entries
            .iter()
            .map(|e| (e.player.clone(), Decimal::ZERO))
            .collect();
        if entries.len() < 2 {
            return deltas;
        }

        match self {
            Wager::StrokePlay { stake, ties } => {
                let winners = low_net(entries);
                let losers = entries.len() - winners.len();
                if losers == 0 || (*ties == TiePolicy::Push && winners.len() > 1) {
                    return deltas;
                }
                for entry in entries {
                    if !winners.contains(&entry.player) {
                        deltas.insert(entry.player.clone(), -*stake);
                    }
                }
                let pot = *stake * Decimal::from(losers);
                for (winner, share) in winners.iter().zip(split_evenly(pot, winners.len())) {
                    deltas.insert((*winner).clone(), share);
                }
            }
            Wager::MatchPlay { stake, mode } => match mode {
                MatchPlayMode::Pairwise => {
                    for (i, a) in entries.iter().enumerate() {
                        for b in &entries[i + 1..] {
                            match a.score.net().cmp(&b.score.net()) {
                                Ordering::Less => transfer(&mut deltas, b.player, a.player, *stake),
                                Ordering::Greater => {
                                    transfer(&mut deltas, a.player, b.player, *stake)
                                }
                                Ordering::Equal => {}
                            }
                        }
                    }
                }
                MatchPlayMode::Teams { team_a, team_b } => {
                    let best_ball = |team: &[PlayerId]| {
                        entries
                            .iter()
                            .filter(|e| team.contains(e.player))
                            .map(|e| e.score.net())
                            .min()
                    };
                    let scores = (best_ball(team_a.as_slice()), best_ball(team_b.as_slice()));
                    let (winners, losers) = match scores {
                        (Some(a), Some(b)) if a < b => (team_a, team_b),
                        (Some(a), Some(b)) if a > b => (team_b, team_a),
                        _ => return deltas,
                    };
                    for entry in entries {
                        if winners.contains(entry.player) {
                            deltas.insert(entry.player.clone(), *stake);
                        } else if losers.contains(entry.player) {
                            deltas.insert(entry.player.clone(), -*stake);
                        }
                    }
                }
            },
            Wager::Skins { stake, .. } => {
                let winners = low_net(entries);
                if winners.len() != 1 {
                    return deltas;
                }
                let per_player = *stake * Decimal::from(context.skins_carry + 1);
                for entry in entries {
                    if entry.player != winners[0] {
                        transfer(&mut deltas, entry.player, winners[0], per_player);
                    }
                }
            }
            Wager::BirdieBonus { stake } => {
                let birdies = entries
                    .iter()
                    .filter(|e| e.score.is_birdie_or_better())
                    .count();
                let others = entries.len() - birdies;
                if birdies == 0 || others == 0 {
                    return deltas;
                }
                for entry in entries {
                    let delta = if entry.score.is_birdie_or_better() {
                        *stake * Decimal::from(others)
                    } else {
                        -*stake * Decimal::from(birdies)
                    };
                    deltas.insert(entry.player.clone(), delta);
                }
            }
            Wager::ClosestToPin { stake } => {
                if context.par != 3 {
                    return deltas;
                }
                let flagged: Vec<&PlayerId> = entries
                    .iter()
                    .filter(|e| e.score.closest_to_pin())
                    .map(|e| e.player)
                    .collect();
                if flagged.len() != 1 {
                    return deltas;
                }
                for entry in entries {
                    if entry.player != flagged[0] {
                        transfer(&mut deltas, entry.player, flagged[0], *stake);
                    }
                }
            }
        }
        deltas
    }

    fn validate_stake(&self) -> Result<()> {
        let stake = self.stake();
        if stake <= Decimal::ZERO {
            return Err(SettlementError::invalid(format!(
                "{} stake must be positive, got {}",
                self.format(),
                stake
            )));
        }
        if stake > MAX_STAKE {
            return Err(SettlementError::invalid(format!(
                "{} stake {} exceeds the maximum of {}",
                self.format(),
                stake,
                MAX_STAKE
            )));
        }
        if stake.normalize().scale() > MONEY_SCALE {
            return Err(SettlementError::invalid(format!(
                "{} stake {} has more than {} decimal places",
                self.format(),
                stake,
                MONEY_SCALE
            )));
        }
        Ok(())
    }
}

/// Whether a skin was won outright on this hole.
pub(crate) fn skin_won(entries: &[HoleEntry<'_>]) -> bool {
    entries.len() >= 2 && low_net(entries).len() == 1
}

/// Players sharing the lowest net score, in entry order.
fn low_net<'a>(entries: &[HoleEntry<'a>]) -> Vec<&'a PlayerId> {
    let Some(low) = entries.iter().map(|e| e.score.net()).min() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|e| e.score.net() == low)
        .map(|e| e.player)
        .collect()
}

fn transfer(deltas: &mut Deltas, from: &PlayerId, to: &PlayerId, amount: Decimal) {
    *deltas.entry(from.clone()).or_insert(Decimal::ZERO) -= amount;
    *deltas.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
}

/// Split `pot` into `ways` cent-rounded shares that add up to exactly `pot`.
///
/// Leftover cents go one each to the earliest shares.
pub fn split_evenly(pot: Decimal, ways: usize) -> Vec<Decimal> {
    if ways == 0 {
        return Vec::new();
    }
    let count = Decimal::from(ways);
    let share = (pot / count).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    let cent = Decimal::new(1, MONEY_SCALE);
    let mut leftover = pot - share * count;
    (0..ways)
        .map(|_| {
            if leftover >= cent {
                leftover -= cent;
                share + cent
            } else {
                share
            }
        })
        .collect()
}

/// The wagers enabled for a round, at most one per format.
///
/// # Examples
///
/// ```
/// use golf_settlement::betting::wager::{BettingOptions, Wager, WagerFormat};
/// use rust_decimal_macros::dec;
///
/// let options = BettingOptions::new()
///     .with(Wager::stroke_play(dec!(10)))
///     .unwrap()
///     .with(Wager::match_play(dec!(5)))
///     .unwrap();
/// assert!(options.is_enabled(WagerFormat::MatchPlay));
/// assert!(options.with(Wager::match_play(dec!(1))).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BettingOptions {
    wagers: Vec<Wager>,
}

impl BettingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable another wager. Fails on a second wager of the same format or
    /// a stake that is not a positive amount of cents.
    pub fn with(mut self, wager: Wager) -> Result<Self> {
        wager.validate_stake()?;
        if self.is_enabled(wager.format()) {
            return Err(SettlementError::invalid(format!(
                "{} is already enabled",
                wager.format()
            )));
        }
        self.wagers.push(wager);
        Ok(self)
    }

    pub fn wagers(&self) -> &[Wager] {
        &self.wagers
    }

    pub fn get(&self, format: WagerFormat) -> Option<&Wager> {
        self.wagers.iter().find(|w| w.format() == format)
    }

    pub fn is_enabled(&self, format: WagerFormat) -> bool {
        self.get(format).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.wagers.is_empty()
    }

    /// Whether a tied skin rolls into the next hole.
    pub fn skins_carry_over(&self) -> bool {
        matches!(
            self.get(WagerFormat::Skins),
            Some(Wager::Skins {
                carryover: true,
                ..
            })
        )
    }

    /// Check the options against a round's roster.
    ///
    /// Options built with [`BettingOptions::with`] are already free of
    /// duplicates and bad stakes; deserialized options are not, so this
    /// re-checks both along with match play teams.
    pub fn validate(&self, roster: &[PlayerId]) -> Result<()> {
        let mut formats = BTreeSet::new();
        for wager in &self.wagers {
            wager.validate_stake()?;
            if !formats.insert(wager.format()) {
                return Err(SettlementError::invalid(format!(
                    "{} is enabled more than once",
                    wager.format()
                )));
            }
            if let Wager::MatchPlay {
                mode: MatchPlayMode::Teams { team_a, team_b },
                ..
            } = wager
            {
                validate_teams(team_a, team_b, roster)?;
            }
        }
        Ok(())
    }
}

fn validate_teams(team_a: &[PlayerId], team_b: &[PlayerId], roster: &[PlayerId]) -> Result<()> {
    if team_a.is_empty() || team_b.is_empty() {
        return Err(SettlementError::invalid("match play teams must not be empty"));
    }
    if team_a.len() != team_b.len() {
        return Err(SettlementError::invalid(format!(
            "match play teams must be the same size, got {} and {}",
            team_a.len(),
            team_b.len()
        )));
    }
    let mut seen = BTreeSet::new();
    for player in team_a.iter().chain(team_b) {
        if !roster.contains(player) {
            return Err(SettlementError::invalid(format!(
                "match play team member {} is not in the round",
                player
            )));
        }
        if !seen.insert(player) {
            return Err(SettlementError::invalid(format!(
                "{} appears on a match play team more than once",
                player
            )));
        }
    }
    Ok(())
}
