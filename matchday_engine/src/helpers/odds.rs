use mbg_common::Odds;
use rand::Rng;

use crate::db_types::Multiplier;

/// Prices the standard book of markets for a new match. Odds are drawn once, when the match is
/// first stored, and never reprice afterwards.
pub fn spread_multipliers<R: Rng>(rng: &mut R) -> Vec<Multiplier> {
    vec![
        Multiplier::new("1", draw(rng, 150, 450)),
        Multiplier::new("X", draw(rng, 280, 420)),
        Multiplier::new("2", draw(rng, 160, 550)),
        Multiplier::new("1X", draw(rng, 110, 175)),
        Multiplier::new("12", draw(rng, 105, 140)),
        Multiplier::new("X2", draw(rng, 115, 200)),
        Multiplier::new("GG", draw(rng, 150, 220)),
        Multiplier::new("NG", draw(rng, 160, 240)),
        Multiplier::new("OVER2.5", draw(rng, 140, 260)),
        Multiplier::new("UNDER2.5", draw(rng, 140, 260)),
    ]
}

fn draw<R: Rng>(rng: &mut R, low: i64, high: i64) -> Odds {
    Odds::from_hundredths(rng.gen_range(low..=high))
}

/// Whether a market pays out for the given final score. Unknown markets never pay.
pub fn multiplier_hits(name: &str, home_goals: i64, away_goals: i64) -> bool {
    match name {
        "1" => home_goals > away_goals,
        "X" => home_goals == away_goals,
        "2" => home_goals < away_goals,
        "1X" => home_goals >= away_goals,
        "12" => home_goals != away_goals,
        "X2" => home_goals <= away_goals,
        "GG" => home_goals > 0 && away_goals > 0,
        "NG" => home_goals == 0 || away_goals == 0,
        "OVER2.5" => home_goals + away_goals > 2,
        "UNDER2.5" => home_goals + away_goals < 3,
        _ => false,
    }
}
