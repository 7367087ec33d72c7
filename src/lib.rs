//! Codec for the Kelvinator family of IR controlled air conditioners.
//!
//! [`protocol::kelvinator::Kelvinator`] turns a [`climate::ClimateState`]
//! into the 16 byte command the unit expects, and back again.

pub mod climate;
pub mod config;
pub mod controller;
pub mod protocol;
