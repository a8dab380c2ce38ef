use crate::betting::wager::{skin_won, BettingOptions, Deltas, HoleContext, HoleEntry, WagerFormat};
use crate::core::course::Hole;
use crate::core::error::{Result, SettlementError};
use crate::core::player::{Player, PlayerId};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Money movements produced by one hole, per wager format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleBetting {
    hole: u8,
    deltas: BTreeMap<WagerFormat, Deltas>,
    /// Skins carried out of this hole into the next.
    skins_carry: u32,
}

impl HoleBetting {
    pub fn hole(&self) -> u8 {
        self.hole
    }

    pub fn deltas(&self) -> &BTreeMap<WagerFormat, Deltas> {
        &self.deltas
    }

    pub fn format_deltas(&self, format: WagerFormat) -> Option<&Deltas> {
        self.deltas.get(&format)
    }

    /// A player's delta in one format, zero if the format is off.
    pub fn delta(&self, player: &PlayerId, format: WagerFormat) -> Decimal {
        self.deltas
            .get(&format)
            .and_then(|d| d.get(player))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// A player's delta summed over every format.
    pub fn player_total(&self, player: &PlayerId) -> Decimal {
        self.deltas.values().filter_map(|d| d.get(player)).sum()
    }

    /// The same deltas keyed player first: `player -> {format: delta}`.
    pub fn by_player(&self) -> BTreeMap<PlayerId, BTreeMap<WagerFormat, Decimal>> {
        let mut view: BTreeMap<PlayerId, BTreeMap<WagerFormat, Decimal>> = BTreeMap::new();
        for (format, deltas) in &self.deltas {
            for (player, delta) in deltas {
                view.entry(player.clone()).or_default().insert(*format, *delta);
            }
        }
        view
    }

    pub fn skins_carry(&self) -> u32 {
        self.skins_carry
    }

    /// True when no wager settled on this hole.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Every format's deltas sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.deltas
            .values()
            .all(|d| d.values().sum::<Decimal>() == Decimal::ZERO)
    }
}

/// Settle every enabled wager for one hole.
///
/// Fewer than two players settle nothing and yield empty deltas. Otherwise
/// every player must already have a score on the hole; a missing score is
/// `IncompleteData`, never an implicit zero.
///
/// # Examples
///
/// ```
/// use golf_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let tee = Tee::new("white");
/// let hole = Hole::new(1, 4).unwrap().with_stroke_index(tee.clone(), 5).unwrap();
/// let a = Player::new(PlayerId::new("a"), "A", 0).unwrap();
/// let b = Player::new(PlayerId::new("b"), "B", 0).unwrap();
/// let a = a.with_score(Score::compute(&hole, &tee, 4, 0).unwrap());
/// let b = b.with_score(Score::compute(&hole, &tee, 5, 0).unwrap());
///
/// let options = BettingOptions::new().with(Wager::match_play(dec!(5))).unwrap();
/// let result = compute_hole_betting(&[a, b], 1, &hole, &options).unwrap();
/// assert_eq!(result.delta(&PlayerId::new("a"), WagerFormat::MatchPlay), dec!(5));
/// assert_eq!(result.delta(&PlayerId::new("b"), WagerFormat::MatchPlay), dec!(-5));
/// ```
pub fn compute_hole_betting(
    players: &[Player],
    hole_number: u8,
    hole: &Hole,
    options: &BettingOptions,
) -> Result<HoleBetting> {
    compute_hole_betting_with_carry(players, hole_number, hole, options, 0)
}

/// [`compute_hole_betting`] with skins carried in from earlier holes.
pub fn compute_hole_betting_with_carry(
    players: &[Player],
    hole_number: u8,
    hole: &Hole,
    options: &BettingOptions,
    skins_carry: u32,
) -> Result<HoleBetting> {
    if hole.number() != hole_number {
        return Err(SettlementError::invalid(format!(
            "hole {} was given reference data for hole {}",
            hole_number,
            hole.number()
        )));
    }
    let roster: Vec<PlayerId> = players.iter().map(|p| p.id().clone()).collect();
    options.validate(&roster)?;
    if players.len() < 2 {
        debug!("hole {}: fewer than two players, nothing to settle", hole_number);
        return Ok(HoleBetting {
            hole: hole_number,
            deltas: BTreeMap::new(),
            skins_carry,
        });
    }

    let entries = players
        .iter()
        .map(|player| {
            player
                .score(hole_number)
                .map(|score| HoleEntry {
                    player: player.id(),
                    score,
                })
                .ok_or_else(|| SettlementError::IncompleteData {
                    hole: hole_number,
                    player: player.id().clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    if entries.iter().filter(|e| e.score.closest_to_pin()).count() > 1 {
        return Err(SettlementError::invalid(format!(
            "hole {} has more than one closest-to-pin winner",
            hole_number
        )));
    }

    let context = HoleContext {
        par: hole.par(),
        skins_carry,
    };
    let deltas: BTreeMap<WagerFormat, Deltas> = options
        .wagers()
        .iter()
        .map(|wager| (wager.format(), wager.evaluate(&entries, &context)))
        .collect();

    let carry_out = if options.skins_carry_over() && !skin_won(&entries) {
        skins_carry + 1
    } else {
        0
    };

    debug!(
        "hole {}: settled {} format(s) for {} players, skins carry {} -> {}",
        hole_number,
        deltas.len(),
        players.len(),
        skins_carry,
        carry_out
    );

    let result = HoleBetting {
        hole: hole_number,
        deltas,
        skins_carry: carry_out,
    };
    debug_assert!(result.is_balanced());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::wager::Wager;
    use crate::core::course::Tee;
    use crate::core::score::Score;
    use rust_decimal_macros::dec;

    fn setup(par: u8) -> (Tee, Hole) {
        let tee = Tee::new("white");
        let hole = Hole::new(1, par)
            .unwrap()
            .with_stroke_index(tee.clone(), 5)
            .unwrap();
        (tee, hole)
    }

    fn player(id: &str, handicap: u8, gross: Option<u8>, tee: &Tee, hole: &Hole) -> Player {
        let p = Player::new(PlayerId::new(id), id.to_uppercase(), handicap).unwrap();
        match gross {
            Some(g) => p.with_score(Score::compute(hole, tee, g, handicap).unwrap()),
            None => p,
        }
    }

    fn all_formats() -> BettingOptions {
        BettingOptions::new()
            .with(Wager::stroke_play(dec!(10)))
            .unwrap()
            .with(Wager::match_play(dec!(5)))
            .unwrap()
            .with(Wager::skins(dec!(1)))
            .unwrap()
            .with(Wager::BirdieBonus { stake: dec!(2) })
            .unwrap()
            .with(Wager::ClosestToPin { stake: dec!(3) })
            .unwrap()
    }

    #[test]
    fn test_stroke_play_tie_after_handicap() {
        let (tee, hole) = setup(4);
        let players = vec![
            player("a", 10, Some(5), &tee, &hole),
            player("b", 0, Some(4), &tee, &hole),
        ];
        let options = BettingOptions::new()
            .with(Wager::stroke_play(dec!(10)))
            .unwrap();
        let result = compute_hole_betting(&players, 1, &hole, &options).unwrap();
        assert_eq!(result.delta(&PlayerId::new("a"), WagerFormat::StrokePlay), dec!(0));
        assert_eq!(result.delta(&PlayerId::new("b"), WagerFormat::StrokePlay), dec!(0));
    }

    #[test]
    fn test_missing_score_is_incomplete() {
        let (tee, hole) = setup(4);
        let players = vec![
            player("a", 0, Some(4), &tee, &hole),
            player("b", 0, None, &tee, &hole),
        ];
        let err = compute_hole_betting(&players, 1, &hole, &all_formats()).unwrap_err();
        assert_eq!(
            err,
            SettlementError::IncompleteData {
                hole: 1,
                player: PlayerId::new("b")
            }
        );
    }

    #[test]
    fn test_single_player_settles_nothing() {
        let (tee, hole) = setup(4);
        let players = vec![player("a", 0, Some(4), &tee, &hole)];
        let result = compute_hole_betting(&players, 1, &hole, &all_formats()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_all_formats_balance() {
        let (tee, hole) = setup(3);
        let mut players = vec![
            player("a", 12, Some(2), &tee, &hole),
            player("b", 0, Some(3), &tee, &hole),
            player("c", 24, Some(4), &tee, &hole),
        ];
        players[1] = players[1].with_score(
            players[1]
                .score(1)
                .unwrap()
                .clone()
                .with_closest_to_pin(true),
        );
        let result = compute_hole_betting(&players, 1, &hole, &all_formats()).unwrap();
        assert_eq!(result.deltas().len(), 5);
        assert!(result.is_balanced());

        // a: net 1 wins stroke play (20), both matches (10), the skin (2)
        // and the birdie bonus (4); pays b for closest to pin (-3).
        let a = PlayerId::new("a");
        assert_eq!(result.player_total(&a), dec!(33));
        assert_eq!(result.by_player()[&a].len(), 5);
        assert_eq!(result.skins_carry(), 0);
    }

    #[test]
    fn test_two_pin_winners_rejected() {
        let (tee, hole) = setup(3);
        let flagged = |id: &str| {
            let p = player(id, 0, Some(3), &tee, &hole);
            let s = p.score(1).unwrap().clone().with_closest_to_pin(true);
            p.with_score(s)
        };
        let players = vec![flagged("a"), flagged("b")];
        assert!(matches!(
            compute_hole_betting(&players, 1, &hole, &all_formats()),
            Err(SettlementError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_skins_carry_out() {
        let (tee, hole) = setup(4);
        let players = vec![
            player("a", 0, Some(4), &tee, &hole),
            player("b", 0, Some(4), &tee, &hole),
        ];
        let options = BettingOptions::new().with(Wager::skins(dec!(1))).unwrap();
        let result = compute_hole_betting_with_carry(&players, 1, &hole, &options, 2).unwrap();
        assert_eq!(result.skins_carry(), 3);

        let no_carry = BettingOptions::new()
            .with(Wager::Skins {
                stake: dec!(1),
                carryover: false,
            })
            .unwrap();
        let result = compute_hole_betting(&players, 1, &hole, &no_carry).unwrap();
        assert_eq!(result.skins_carry(), 0);
    }

    #[test]
    fn test_oversized_stake_is_an_error() {
        let (tee, hole) = setup(4);
        let players = vec![
            player("a", 0, Some(3), &tee, &hole),
            player("b", 0, Some(5), &tee, &hole),
            player("c", 0, Some(5), &tee, &hole),
        ];
        let options: BettingOptions = serde_json::from_str(
            r#"[{ "format": "stroke_play", "stake": "40000000000000000000000000000" }]"#,
        )
        .unwrap();
        assert!(matches!(
            compute_hole_betting(&players, 1, &hole, &options),
            Err(SettlementError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_mismatched_hole_rejected() {
        let (tee, hole) = setup(4);
        let players = vec![
            player("a", 0, Some(4), &tee, &hole),
            player("b", 0, Some(4), &tee, &hole),
        ];
        assert!(compute_hole_betting(&players, 2, &hole, &all_formats()).is_err());
    }
}
