use crate::core::player::PlayerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single payment that settles part of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: PlayerId,
    pub to: PlayerId,
    pub amount: Decimal,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// Turn final balances into a short list of payments.
///
/// Instead of every pair squaring up per wager, each losing player pays
/// winners directly: the largest debtor pays the largest creditor until one
/// of them is square, then moves on. This needs at most `players - 1`
/// payments, and the total paid equals the total owed.
///
/// # Examples
///
/// ```
/// use golf_settlement::betting::transfers::plan_transfers;
/// use golf_settlement::core::player::PlayerId;
/// use rust_decimal_macros::dec;
/// use std::collections::BTreeMap;
///
/// let balances = BTreeMap::from([
///     (PlayerId::new("a"), dec!(15)),
///     (PlayerId::new("b"), dec!(-5)),
///     (PlayerId::new("c"), dec!(-10)),
/// ]);
/// let plan = plan_transfers(&balances);
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[0].from, PlayerId::new("c"));
/// assert_eq!(plan[0].amount, dec!(10));
/// ```
pub fn plan_transfers(balances: &BTreeMap<PlayerId, Decimal>) -> Vec<Transfer> {
    let by_amount_desc = |a: &(PlayerId, Decimal), b: &(PlayerId, Decimal)| {
        b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
    };

    let mut debtors: Vec<(PlayerId, Decimal)> = balances
        .iter()
        .filter(|(_, v)| **v < Decimal::ZERO)
        .map(|(p, v)| (p.clone(), v.abs()))
        .collect();
    let mut creditors: Vec<(PlayerId, Decimal)> = balances
        .iter()
        .filter(|(_, v)| **v > Decimal::ZERO)
        .map(|(p, v)| (p.clone(), *v))
        .collect();
    debtors.sort_by(by_amount_desc);
    creditors.sort_by(by_amount_desc);

    let mut transfers = Vec::new();
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let amount = debtors[d].1.min(creditors[c].1);
        transfers.push(Transfer {
            from: debtors[d].0.clone(),
            to: creditors[c].0.clone(),
            amount,
        });
        debtors[d].1 -= amount;
        creditors[c].1 -= amount;
        if debtors[d].1 == Decimal::ZERO {
            d += 1;
        }
        if creditors[c].1 == Decimal::ZERO {
            c += 1;
        }
    }
    transfers
}
