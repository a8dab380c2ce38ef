pub mod course;
pub mod error;
pub mod ledger;
pub mod player;
pub mod round;
pub mod score;
