//! Odds helpers. Pricing the market book for a new match, and resolving markets against
//! final scores.

mod odds;

pub use odds::{multiplier_hits, spread_multipliers};
