pub mod hole;
pub mod settlement;
pub mod transfers;
pub mod wager;
