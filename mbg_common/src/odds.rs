use std::{fmt::Display, ops::Mul, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::Money;

//--------------------------------------        Odds          --------------------------------------------------------
/// A decimal betting multiplier in hundredths, so `1.69` is stored as `169`.
/// Keeping hundredths in an integer column sidesteps float drift when the
/// same multiplier is read back for settlement.
#[derive(Debug, Clone, Copy, Type, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Odds(i64);

impl Odds {
    pub fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Multiplies a stake by these odds, truncating sub-cent remainders.
    pub fn apply(&self, stake: Money) -> Money {
        Money::from(stake.value() * self.0 / 100)
    }
}

impl Default for Odds {
    fn default() -> Self {
        // Even odds.
        Self(100)
    }
}

impl From<i64> for Odds {
    fn from(hundredths: i64) -> Self {
        Self(hundredths)
    }
}

impl Mul<Odds> for Money {
    type Output = Money;

    fn mul(self, rhs: Odds) -> Self::Output {
        rhs.apply(self)
    }
}

impl Display for Odds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid odds value: {0}")]
pub struct OddsParseError(String);

impl FromStr for Odds {
    type Err = OddsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        let whole = whole.trim().parse::<i64>().map_err(|e| OddsParseError(format!("{s}: {e}")))?;
        let frac = match frac.trim() {
            "" => 0,
            f if f.len() <= 2 && f.chars().all(|c| c.is_ascii_digit()) => {
                let n = f.parse::<i64>().map_err(|e| OddsParseError(format!("{s}: {e}")))?;
                if f.len() == 1 {
                    n * 10
                } else {
                    n
                }
            },
            _ => return Err(OddsParseError(format!("{s}: at most two decimal places"))),
        };
        if whole < 0 {
            return Err(OddsParseError(format!("{s}: odds cannot be negative")));
        }
        Ok(Self(whole * 100 + frac))
    }
}
