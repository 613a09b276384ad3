//! Discord command implementations organized by form.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Absence log commands
pub mod absence;

/// Production dashboard commands
pub mod dashboard;

/// Design catalogue commands
pub mod designs;

/// General utility commands
pub mod general;

/// Daily production commands
pub mod production;

/// Employee roster commands
pub mod roster;

/// Work order commands
pub mod work_order;

// Export commands
pub use absence::*;
pub use dashboard::*;
pub use designs::*;
pub use general::*;
pub use production::*;
pub use roster::*;
pub use work_order::*;

use crate::{
    bot::BotData,
    core::dates::{Period, parse_date},
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Longest list a single reply shows
pub const MAX_LISTED: usize = 20;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        production(),
        roster(),
        absence(),
        work_order(),
        designs(),
        dashboard(),
    ]
}

/// Today's date on the host clock.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parses an optional `DD/MM/YYYY` option, defaulting to today.
pub fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    value.map_or_else(|| Ok(today()), parse_date)
}

/// Picks the requested month, or the newest one that has data.
///
/// `None` means there is nothing to report on.
pub fn pick_period(requested: Option<&str>, available: &[Period]) -> Result<Option<Period>> {
    match requested {
        Some(value) => Period::parse(value).map(Some),
        None => Ok(available.first().copied()),
    }
}
