//! A four-player skins game with carryovers.
//!
//! Tied holes roll their skin into the next hole; the first outright low
//! net score collects everything carried.

use golf_settlement::prelude::*;
use golf_settlement::simulation::random_round::{generate_random_round, RoundConfig};
use rust_decimal_macros::dec;

fn main() -> Result<(), SettlementError> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  golf-settlement: Skins Game Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let config = RoundConfig {
        player_count: 4,
        hole_count: 18,
        max_handicap: 18,
        wagers: vec![Wager::skins(dec!(2))],
    };
    let round = generate_random_round(&config)?;
    let settlement = settle_round(&round)?;

    let mut carried = 0;
    for hole in settlement.holes() {
        let deltas = hole.format_deltas(WagerFormat::Skins);
        let winner = deltas.and_then(|d| d.iter().find(|(_, v)| **v > dec!(0)));
        match winner {
            Some((player, amount)) => {
                println!(
                    "  Hole {:>2}: {} wins {} skin(s), +{}",
                    hole.hole(),
                    player,
                    carried + 1,
                    amount
                );
            }
            None => println!("  Hole {:>2}: tied, skin carries", hole.hole()),
        }
        carried = hole.skins_carry();
    }

    println!("\n{}", settlement);
    Ok(())
}
