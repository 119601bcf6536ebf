mod helpers;
mod money;
mod odds;

pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use money::{Money, MoneyConversionError, EUR_CURRENCY_CODE, EUR_CURRENCY_CODE_LOWER};
pub use odds::{Odds, OddsParseError};
pub use secret::Secret;
