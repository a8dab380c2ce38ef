use crate::core::error::{Result, SettlementError};
use crate::core::score::validate_stroke_index;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Highest hole number on a course.
pub const MAX_HOLES: u8 = 18;

/// A set of tee markers ("white", "blue", ...).
///
/// The selected tee decides which stroke-index table applies to a hole.
///
/// # Examples
///
/// ```
/// use golf_settlement::core::course::Tee;
///
/// let white = Tee::new("white");
/// assert_eq!(white.as_str(), "white");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tee(String);

impl Tee {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Tee {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference data for one hole of a course.
///
/// # Examples
///
/// ```
/// use golf_settlement::core::course::{Hole, Tee};
///
/// let hole = Hole::new(1, 4)
///     .unwrap()
///     .with_stroke_index(Tee::new("white"), 7)
///     .unwrap();
/// assert_eq!(hole.stroke_index(&Tee::new("white")).unwrap(), 7);
/// assert!(hole.stroke_index(&Tee::new("blue")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    number: u8,
    par: u8,
    stroke_indexes: BTreeMap<Tee, u8>,
}

impl Hole {
    /// Create a hole. `number` must be 1..=18 and `par` 3..=5.
    pub fn new(number: u8, par: u8) -> Result<Self> {
        if !(1..=MAX_HOLES).contains(&number) {
            return Err(SettlementError::invalid(format!(
                "hole number {} is outside 1..={}",
                number, MAX_HOLES
            )));
        }
        if !(3..=5).contains(&par) {
            return Err(SettlementError::invalid(format!(
                "hole {} has par {}, expected 3..=5",
                number, par
            )));
        }
        Ok(Self {
            number,
            par,
            stroke_indexes: BTreeMap::new(),
        })
    }

    /// Set the stroke index used when playing from `tee`.
    pub fn with_stroke_index(mut self, tee: Tee, stroke_index: u8) -> Result<Self> {
        validate_stroke_index(stroke_index)?;
        self.stroke_indexes.insert(tee, stroke_index);
        Ok(self)
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn par(&self) -> u8 {
        self.par
    }

    /// Stroke index for `tee`. A tee the hole has no rating for is invalid
    /// configuration.
    pub fn stroke_index(&self, tee: &Tee) -> Result<u8> {
        self.stroke_indexes.get(tee).copied().ok_or_else(|| {
            SettlementError::invalid(format!(
                "hole {} has no stroke index for tee {}",
                self.number, tee
            ))
        })
    }

    pub fn tees(&self) -> impl Iterator<Item = &Tee> {
        self.stroke_indexes.keys()
    }
}

/// A course: an identifier and its holes, kept in hole-number order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    id: String,
    holes: Vec<Hole>,
}

impl Course {
    /// Build a course. Hole numbers must be unique.
    pub fn new(id: impl Into<String>, mut holes: Vec<Hole>) -> Result<Self> {
        let id = id.into();
        let mut seen = BTreeSet::new();
        for hole in &holes {
            if !seen.insert(hole.number()) {
                return Err(SettlementError::invalid(format!(
                    "course {} lists hole {} more than once",
                    id,
                    hole.number()
                )));
            }
        }
        holes.sort_by_key(Hole::number);
        Ok(Self { id, holes })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn hole(&self, number: u8) -> Option<&Hole> {
        self.holes.iter().find(|h| h.number() == number)
    }

    pub fn len(&self) -> usize {
        self.holes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    /// Combined par of holes 1..=`through`.
    pub fn par_through(&self, through: u8) -> u32 {
        self.holes
            .iter()
            .filter(|h| h.number() <= through)
            .map(|h| u32::from(h.par()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_validation() {
        assert!(Hole::new(0, 4).is_err());
        assert!(Hole::new(19, 4).is_err());
        assert!(Hole::new(1, 2).is_err());
        assert!(Hole::new(1, 6).is_err());
        assert!(Hole::new(18, 5).is_ok());
    }

    #[test]
    fn test_stroke_index_per_tee() {
        let hole = Hole::new(3, 5)
            .unwrap()
            .with_stroke_index(Tee::new("white"), 1)
            .unwrap()
            .with_stroke_index(Tee::new("red"), 3)
            .unwrap();
        assert_eq!(hole.stroke_index(&Tee::new("white")).unwrap(), 1);
        assert_eq!(hole.stroke_index(&Tee::new("red")).unwrap(), 3);
        assert_eq!(hole.tees().count(), 2);
    }

    #[test]
    fn test_stroke_index_rejected_out_of_range() {
        let hole = Hole::new(1, 4).unwrap();
        assert!(hole.clone().with_stroke_index(Tee::new("white"), 0).is_err());
        assert!(hole.with_stroke_index(Tee::new("white"), 19).is_err());
    }

    #[test]
    fn test_course_sorts_and_rejects_duplicates() {
        let course = Course::new(
            "links",
            vec![Hole::new(2, 3).unwrap(), Hole::new(1, 4).unwrap()],
        )
        .unwrap();
        assert_eq!(course.holes()[0].number(), 1);
        assert_eq!(course.par_through(2), 7);
        assert_eq!(course.par_through(1), 4);

        let dup = Course::new(
            "links",
            vec![Hole::new(1, 4).unwrap(), Hole::new(1, 3).unwrap()],
        );
        assert!(matches!(dup, Err(SettlementError::InvalidInput(_))));
    }
}
