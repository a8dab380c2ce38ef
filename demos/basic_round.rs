//! A nine-hole round with stroke play and match play.
//!
//! Shows how handicap strokes turn gross scores into net scores and how
//! each hole moves money between players.

use chrono::Utc;
use golf_settlement::prelude::*;
use golf_settlement::simulation::random_round::standard_course;
use rust_decimal_macros::dec;

fn main() -> Result<(), SettlementError> {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  golf-settlement: Basic Round Example     ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let ann = PlayerId::new("ann");
    let ben = PlayerId::new("ben");
    let players = vec![
        Player::new(ann.clone(), "Ann", 12)?,
        Player::new(ben.clone(), "Ben", 2)?,
    ];
    let betting = BettingOptions::new()
        .with(Wager::stroke_play(dec!(10)))?
        .with(Wager::match_play(dec!(5)))?;

    let mut round = Round::new(&standard_course()?, 9, Tee::new("white"), players, betting)?;

    let cards = [
        (&ann, [5, 6, 4, 5, 5, 4, 5, 6, 5]),
        (&ben, [4, 5, 3, 4, 5, 3, 4, 5, 4]),
    ];

    println!("━━━ Hole by hole ━━━\n");
    for hole in 1..=9u8 {
        for (id, card) in &cards {
            round = round.record_score(id, hole, card[usize::from(hole) - 1])?;
        }
        let result =
            compute_hole_betting(round.players(), hole, round.hole(hole)?, round.betting())?;
        for player in round.players() {
            let score = player
                .score(hole)
                .map(|s| (s.gross(), s.net()))
                .unwrap_or_default();
            println!(
                "  Hole {} {:<4} gross {} net {}  {:>+7}",
                hole,
                player.name(),
                score.0,
                score.1,
                result.player_total(player.id())
            );
        }
        round = round.advance()?;
    }

    let (done, settlement) = round.complete(Utc::now())?;
    println!("\n{}", settlement);

    for player in done.players() {
        println!("  {:<4} final balance {}", player.name(), player.balance());
    }
    Ok(())
}
