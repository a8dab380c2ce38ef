use crate::betting::hole::HoleBetting;
use crate::betting::wager::WagerFormat;
use crate::core::player::PlayerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tracks each player's running money position in each wager format.
///
/// A positive balance means the player is up (net winner).
/// A negative balance means the player is down.
///
/// Every hole applied to the ledger is zero-sum per format, so the ledger
/// always balances: the positions of any one format sum to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// (PlayerId, WagerFormat) -> running balance
    #[serde(with = "positions_serde")]
    positions: BTreeMap<(PlayerId, WagerFormat), Decimal>,
}

mod positions_serde {
    use super::*;
    use serde::de::{self, MapAccess, Visitor};
    use serde::ser::SerializeMap;

    pub fn serialize<S: serde::Serializer>(
        positions: &BTreeMap<(PlayerId, WagerFormat), Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(positions.len()))?;
        for ((player, format), amount) in positions {
            map.serialize_entry(&format!("{}:{}", player, format), amount)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(PlayerId, WagerFormat), Decimal>, D::Error> {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = BTreeMap<(PlayerId, WagerFormat), Decimal>;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map with \"player:format\" keys")
            }
            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, Decimal>()? {
                    // Player ids may contain ':', formats never do.
                    let (player, format) = key
                        .rsplit_once(':')
                        .ok_or_else(|| de::Error::custom(format!("invalid key: {}", key)))?;
                    let format: WagerFormat = format.parse().map_err(de::Error::custom)?;
                    map.insert((PlayerId::new(player), format), value);
                }
                Ok(map)
            }
        }
        deserializer.deserialize_map(V)
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit or debit a single player's position in one format.
    pub fn apply_delta(&mut self, player: &PlayerId, format: WagerFormat, delta: Decimal) {
        *self
            .positions
            .entry((player.clone(), format))
            .or_insert(Decimal::ZERO) += delta;
    }

    /// Apply every delta of a settled hole.
    pub fn apply_hole(&mut self, hole: &HoleBetting) {
        for (format, deltas) in hole.deltas() {
            for (player, delta) in deltas {
                self.apply_delta(player, *format, *delta);
            }
        }
    }

    /// Position of a player in one format.
    pub fn position(&self, player: &PlayerId, format: WagerFormat) -> Decimal {
        self.positions
            .get(&(player.clone(), format))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// A player's positions broken down by format.
    pub fn positions_for_player(&self, player: &PlayerId) -> BTreeMap<WagerFormat, Decimal> {
        self.positions
            .iter()
            .filter(|((p, _), _)| p == player)
            .map(|((_, f), &v)| (*f, v))
            .collect()
    }

    /// A player's balance summed across all formats.
    pub fn balance(&self, player: &PlayerId) -> Decimal {
        self.positions
            .iter()
            .filter(|((p, _), _)| p == player)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Every player's balance summed across formats.
    pub fn balances(&self) -> BTreeMap<PlayerId, Decimal> {
        let mut balances = BTreeMap::new();
        for ((player, _), amount) in &self.positions {
            *balances.entry(player.clone()).or_insert(Decimal::ZERO) += amount;
        }
        balances
    }

    pub fn all_positions(&self) -> &BTreeMap<(PlayerId, WagerFormat), Decimal> {
        &self.positions
    }

    /// Verify that the ledger is balanced: sum of all positions per format = 0.
    pub fn is_balanced(&self) -> bool {
        let mut format_sums: BTreeMap<WagerFormat, Decimal> = BTreeMap::new();
        for ((_, format), amount) in &self.positions {
            *format_sums.entry(*format).or_insert(Decimal::ZERO) += amount;
        }
        format_sums.values().all(|sum| *sum == Decimal::ZERO)
    }

    /// Total money changing hands: the sum of all winning balances.
    pub fn total_won(&self) -> Decimal {
        self.balances()
            .values()
            .filter(|v| **v > Decimal::ZERO)
            .sum()
    }
}
