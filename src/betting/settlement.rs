use crate::betting::hole::{compute_hole_betting_with_carry, HoleBetting};
use crate::betting::transfers::{plan_transfers, Transfer};
use crate::core::error::{Result, SettlementError};
use crate::core::ledger::Ledger;
use crate::core::player::{Player, PlayerId};
use crate::core::round::{Round, RoundId};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stroke and money totals for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTotals {
    pub gross: u32,
    pub net: u32,
    /// Gross strokes relative to par over the settled holes.
    pub to_par: i32,
    pub balance: Decimal,
}

/// The outcome of settling a round, or the first holes of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSettlement {
    round_id: RoundId,
    through_hole: u8,
    holes: Vec<HoleBetting>,
    ledger: Ledger,
    totals: BTreeMap<PlayerId, PlayerTotals>,
    /// Skins still carried after the last settled hole.
    skins_carry: u32,
}

impl RoundSettlement {
    pub fn round_id(&self) -> &RoundId {
        &self.round_id
    }

    /// Last hole included in this settlement.
    pub fn through_hole(&self) -> u8 {
        self.through_hole
    }

    pub fn holes(&self) -> &[HoleBetting] {
        &self.holes
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn totals(&self) -> &BTreeMap<PlayerId, PlayerTotals> {
        &self.totals
    }

    pub fn player_totals(&self, player: &PlayerId) -> Option<&PlayerTotals> {
        self.totals.get(player)
    }

    /// A player's money balance across all formats and holes.
    pub fn balance(&self, player: &PlayerId) -> Decimal {
        self.totals
            .get(player)
            .map(|t| t.balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn balances(&self) -> BTreeMap<PlayerId, Decimal> {
        self.totals
            .iter()
            .map(|(player, totals)| (player.clone(), totals.balance))
            .collect()
    }

    /// Skins tied on the final holes and never won. These are void and no
    /// money moves for them.
    pub fn unclaimed_skins(&self) -> u32 {
        self.skins_carry
    }

    /// The ledger balances and every hole is zero-sum.
    pub fn is_valid(&self) -> bool {
        self.ledger.is_balanced() && self.holes.iter().all(HoleBetting::is_balanced)
    }

    /// Payments that square the round.
    pub fn transfers(&self) -> Vec<Transfer> {
        plan_transfers(&self.balances())
    }
}

impl std::fmt::Display for RoundSettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Round Settlement ===")?;
        writeln!(f, "Round:           {}", self.round_id)?;
        writeln!(f, "Through hole:    {}", self.through_hole)?;
        writeln!(f, "Valid:           {}", self.is_valid())?;
        writeln!(f, "Unclaimed skins: {}", self.skins_carry)?;

        writeln!(
            f,
            "\n{:<16} {:>6} {:>5} {:>7} {:>10}",
            "Player", "Gross", "Net", "To Par", "Balance"
        )?;
        for (player, totals) in &self.totals {
            writeln!(
                f,
                "{:<16} {:>6} {:>5} {:>+7} {:>10}",
                player.as_str(),
                totals.gross,
                totals.net,
                totals.to_par,
                totals.balance
            )?;
        }

        let transfers = self.transfers();
        if !transfers.is_empty() {
            writeln!(f, "\n--- Payments ---")?;
            for transfer in &transfers {
                writeln!(f, "  {}", transfer)?;
            }
        }
        Ok(())
    }
}

/// Settle a finished round: every hole, every format, every player.
///
/// A pure fold over the recorded scores; calling it twice on the same round
/// gives identical results. Any missing score is `IncompleteRound`.
pub fn settle_round(round: &Round) -> Result<RoundSettlement> {
    if let Some((hole, player)) = round.first_missing_score() {
        return Err(SettlementError::IncompleteRound {
            hole,
            player: player.clone(),
        });
    }
    let settlement = settle_through(round, round.hole_count())?;
    if settlement.unclaimed_skins() > 0 {
        warn!(
            "round {}: {} skin(s) tied through the last hole and go unclaimed",
            round.id(),
            settlement.unclaimed_skins()
        );
    }
    Ok(settlement)
}

/// Running settlement over holes 1..=`through`, for showing balances while a
/// round is still being played. A missing score in that range is
/// `IncompleteData`; a round whose recorded data breaks its own invariants
/// (for example one edited as JSON) is `InvalidInput`.
pub fn settle_through(round: &Round, through: u8) -> Result<RoundSettlement> {
    round.validate()?;
    if through == 0 || through > round.hole_count() {
        return Err(SettlementError::invalid(format!(
            "cannot settle through hole {} of a {}-hole round",
            through,
            round.hole_count()
        )));
    }

    let mut ledger = Ledger::new();
    let mut holes = Vec::with_capacity(usize::from(through));
    let mut skins_carry = 0;

    for number in 1..=through {
        for player in round.players() {
            if player.score(number).is_none() {
                return Err(SettlementError::IncompleteData {
                    hole: number,
                    player: player.id().clone(),
                });
            }
        }
        let hole = round.hole(number)?;
        let result = compute_hole_betting_with_carry(
            round.players(),
            number,
            hole,
            round.betting(),
            skins_carry,
        )?;
        ledger.apply_hole(&result);
        skins_carry = result.skins_carry();
        holes.push(result);
    }

    let totals = round
        .players()
        .iter()
        .map(|player| {
            (
                player.id().clone(),
                player_totals(player, through, ledger.balance(player.id())),
            )
        })
        .collect();

    Ok(RoundSettlement {
        round_id: round.id().clone(),
        through_hole: through,
        holes,
        ledger,
        totals,
        skins_carry,
    })
}

fn player_totals(player: &Player, through: u8, balance: Decimal) -> PlayerTotals {
    let mut totals = PlayerTotals {
        gross: 0,
        net: 0,
        to_par: 0,
        balance,
    };
    for score in player.scores().filter(|s| s.hole() <= through) {
        totals.gross += u32::from(score.gross());
        totals.net += u32::from(score.net());
        totals.to_par += i32::from(score.to_par());
    }
    totals
}
