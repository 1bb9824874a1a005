//! Instruction handlers

pub mod admin;
pub mod competition;
pub mod payout;
pub mod player;

pub use admin::*;
pub use competition::*;
pub use payout::*;
pub use player::*;
