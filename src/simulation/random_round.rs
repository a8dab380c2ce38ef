//! Random round generation for stress tests, benchmarks and the CLI.
//!
//! Scores are drawn around par with a spread that widens with handicap, so
//! generated rounds produce a realistic mix of wins, ties and carried skins.

use crate::betting::wager::{BettingOptions, Wager};
use crate::core::course::{Course, Hole, Tee};
use crate::core::error::Result;
use crate::core::player::{Player, PlayerId, MAX_HANDICAP};
use crate::core::round::Round;
use rand::Rng;
use rust_decimal_macros::dec;

/// Tee rated on [`standard_course`].
pub const STANDARD_TEE: &str = "white";

const STANDARD_PARS: [u8; 18] = [4, 5, 3, 4, 4, 3, 4, 5, 4, 4, 3, 5, 4, 4, 3, 4, 5, 4];
const STANDARD_INDEXES: [u8; 18] = [7, 1, 17, 3, 11, 15, 5, 9, 13, 8, 16, 2, 12, 4, 18, 10, 6, 14];

/// An 18-hole, par 72 course rated from the white tee. Odd stroke indexes
/// are on the front nine, even on the back.
pub fn standard_course() -> Result<Course> {
    let tee = Tee::new(STANDARD_TEE);
    let holes = STANDARD_PARS
        .iter()
        .zip(STANDARD_INDEXES)
        .enumerate()
        .map(|(i, (par, index))| {
            Hole::new(i as u8 + 1, *par)?.with_stroke_index(tee.clone(), index)
        })
        .collect::<Result<Vec<_>>>()?;
    Course::new("standard", holes)
}

/// Configuration for generating a random round.
#[derive(Debug, Clone)]
pub struct RoundConfig {
    /// Number of players in the round.
    pub player_count: usize,
    /// 9 or 18.
    pub hole_count: u8,
    /// Handicaps are drawn from 0..=max_handicap.
    pub max_handicap: u8,
    /// Wagers to enable.
    pub wagers: Vec<Wager>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            player_count: 4,
            hole_count: 18,
            max_handicap: 28,
            wagers: vec![
                Wager::stroke_play(dec!(10)),
                Wager::match_play(dec!(5)),
                Wager::skins(dec!(1)),
                Wager::BirdieBonus { stake: dec!(2) },
                Wager::ClosestToPin { stake: dec!(5) },
            ],
        }
    }
}

/// Generate a fully scored random round on [`standard_course`].
pub fn generate_random_round(config: &RoundConfig) -> Result<Round> {
    let mut rng = rand::thread_rng();

    let mut betting = BettingOptions::new();
    for wager in &config.wagers {
        betting = betting.with(wager.clone())?;
    }

    let max_handicap = config.max_handicap.min(MAX_HANDICAP);
    let players = (0..config.player_count)
        .map(|i| {
            Player::new(
                PlayerId::new(format!("PLAYER-{:02}", i)),
                format!("Player {}", i + 1),
                rng.gen_range(0..=max_handicap),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::new(
        &standard_course()?,
        config.hole_count,
        Tee::new(STANDARD_TEE),
        players,
        betting,
    )?;

    let ids: Vec<(PlayerId, u8)> = round
        .players()
        .iter()
        .map(|p| (p.id().clone(), p.handicap()))
        .collect();

    for number in 1..=config.hole_count {
        let par = round.hole(number)?.par();
        for (id, handicap) in &ids {
            // A handicap of h averages roughly h/18 strokes over par per hole.
            let spread = 1 + handicap / 12;
            let low = par.saturating_sub(1).max(1);
            let gross = rng.gen_range(low..=par + spread);
            round = round.record_score(id, number, gross)?;
        }
        if par == 3 && !ids.is_empty() {
            let (winner, _) = &ids[rng.gen_range(0..ids.len())];
            round = round.mark_closest_to_pin(number, winner)?;
        }
    }

    Ok(round)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::settlement::settle_round;

    #[test]
    fn test_standard_course() {
        let course = standard_course().unwrap();
        assert_eq!(course.len(), 18);
        assert_eq!(course.par_through(18), 72);
        assert_eq!(course.par_through(9), 36);

        let tee = Tee::new(STANDARD_TEE);
        let mut indexes: Vec<u8> = course
            .holes()
            .iter()
            .map(|h| h.stroke_index(&tee).unwrap())
            .collect();
        indexes.sort();
        assert_eq!(indexes, (1..=18).collect::<Vec<u8>>());
    }

    #[test]
    fn test_random_round_generation() {
        let config = RoundConfig {
            player_count: 5,
            hole_count: 9,
            ..Default::default()
        };
        let round = generate_random_round(&config).unwrap();
        assert_eq!(round.players().len(), 5);
        assert!(round.is_complete());
    }

    #[test]
    fn test_random_round_settles() {
        let round = generate_random_round(&RoundConfig::default()).unwrap();
        let settlement = settle_round(&round).unwrap();
        assert!(settlement.is_valid());
        assert_eq!(settlement.holes().len(), 18);
    }
}
