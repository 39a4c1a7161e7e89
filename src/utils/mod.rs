//! # Utilities Module
//!
//! Small numeric helpers used across the game rules.

pub mod math;

pub use math::*;
