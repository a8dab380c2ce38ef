//! # golf-settlement
//!
//! Handicap-aware betting settlement for golf rounds.
//!
//! Given a round's players, handicaps, tee, enabled wagers and the gross
//! scores recorded hole by hole, this engine computes net scores, per-hole
//! money movements for each wager format, and each player's final balance.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: players, courses, scores, rounds, ledger
//! - **betting** — Wager formats, hole settlement, round settlement, payouts
//! - **simulation** — Random round generation for stress tests and benchmarks
//!
//! Every calculation is pure: rounds are immutable values and settlement is
//! a fold over their recorded scores.

pub mod betting;
pub mod core;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::betting::hole::{compute_hole_betting, HoleBetting};
    pub use crate::betting::settlement::{
        settle_round, settle_through, PlayerTotals, RoundSettlement,
    };
    pub use crate::betting::transfers::Transfer;
    pub use crate::betting::wager::{
        BettingOptions, MatchPlayMode, TiePolicy, Wager, WagerFormat,
    };
    pub use crate::core::course::{Course, Hole, Tee};
    pub use crate::core::error::SettlementError;
    pub use crate::core::ledger::Ledger;
    pub use crate::core::player::{Player, PlayerId};
    pub use crate::core::round::{Round, RoundId, RoundStatus};
    pub use crate::core::score::{compute_net_score, NetScore, Score};
}
