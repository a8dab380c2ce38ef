//! Handicap stroke allocation and per-hole score records.

use crate::core::course::{Hole, Tee};
use crate::core::error::{Result, SettlementError};
use crate::core::player::validate_handicap;
use serde::{Deserialize, Serialize};

pub const MIN_STROKE_INDEX: u8 = 1;
pub const MAX_STROKE_INDEX: u8 = 18;

/// Highest gross score accepted for a single hole.
pub const MAX_GROSS_SCORE: u8 = 20;

/// Handicap strokes are handed out one per hole in stroke-index order,
/// then a second pass starts again from index 1.
const STROKES_PER_PASS: u8 = 18;

pub fn validate_stroke_index(stroke_index: u8) -> Result<()> {
    if !(MIN_STROKE_INDEX..=MAX_STROKE_INDEX).contains(&stroke_index) {
        return Err(SettlementError::invalid(format!(
            "stroke index {} is outside {}..={}",
            stroke_index, MIN_STROKE_INDEX, MAX_STROKE_INDEX
        )));
    }
    Ok(())
}

pub fn validate_gross(gross: u8) -> Result<()> {
    if gross == 0 || gross > MAX_GROSS_SCORE {
        return Err(SettlementError::invalid(format!(
            "gross score {} is outside 1..={}",
            gross, MAX_GROSS_SCORE
        )));
    }
    Ok(())
}

/// Result of applying a handicap to a gross score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetScore {
    pub net_score: u8,
    pub strokes_received: u8,
}

/// Handicap strokes a player receives on a hole: 0, 1 or 2.
///
/// # Examples
///
/// ```
/// use golf_settlement::core::score::strokes_received;
///
/// assert_eq!(strokes_received(10, 5).unwrap(), 1);
/// assert_eq!(strokes_received(10, 11).unwrap(), 0);
/// assert_eq!(strokes_received(25, 7).unwrap(), 2);
/// ```
pub fn strokes_received(handicap: u8, stroke_index: u8) -> Result<u8> {
    validate_handicap(handicap)?;
    validate_stroke_index(stroke_index)?;

    let mut strokes = 0;
    if handicap >= stroke_index {
        strokes += 1;
    }
    if handicap >= stroke_index + STROKES_PER_PASS {
        strokes += 1;
    }
    Ok(strokes)
}

/// Convert a gross score into a net score for one hole.
///
/// The net score never drops below zero.
pub fn compute_net_score(gross: u8, handicap: u8, stroke_index: u8) -> Result<NetScore> {
    validate_gross(gross)?;
    let strokes = strokes_received(handicap, stroke_index)?;
    Ok(NetScore {
        net_score: gross.saturating_sub(strokes),
        strokes_received: strokes,
    })
}

/// One player's result on one hole.
///
/// Carries the hole's par and stroke index as they were when the score was
/// entered, so later settlement does not depend on re-reading course data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    hole: u8,
    gross: u8,
    net: u8,
    strokes_received: u8,
    par: u8,
    stroke_index: u8,
    #[serde(default)]
    closest_to_pin: bool,
}

impl Score {
    /// Score `gross` strokes on `hole` played from `tee` with `handicap`.
    pub fn compute(hole: &Hole, tee: &Tee, gross: u8, handicap: u8) -> Result<Self> {
        let stroke_index = hole.stroke_index(tee)?;
        let net = compute_net_score(gross, handicap, stroke_index)?;
        Ok(Self {
            hole: hole.number(),
            gross,
            net: net.net_score,
            strokes_received: net.strokes_received,
            par: hole.par(),
            stroke_index,
            closest_to_pin: false,
        })
    }

    pub fn with_closest_to_pin(mut self, closest: bool) -> Self {
        self.closest_to_pin = closest;
        self
    }

    pub fn hole(&self) -> u8 {
        self.hole
    }

    pub fn gross(&self) -> u8 {
        self.gross
    }

    pub fn net(&self) -> u8 {
        self.net
    }

    pub fn strokes_received(&self) -> u8 {
        self.strokes_received
    }

    pub fn par(&self) -> u8 {
        self.par
    }

    pub fn stroke_index(&self) -> u8 {
        self.stroke_index
    }

    pub fn closest_to_pin(&self) -> bool {
        self.closest_to_pin
    }

    /// Gross strokes relative to par (negative is under par).
    pub fn to_par(&self) -> i16 {
        i16::from(self.gross) - i16::from(self.par)
    }

    pub fn is_birdie_or_better(&self) -> bool {
        self.gross < self.par
    }
}
