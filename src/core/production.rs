//! Production business logic - daily figures per sector and subsector.
//!
//! A production entry records what one subsector produced on one day, split into
//! regular hours and overtime. The total is always derived from those two numbers;
//! overtime only counts when the overtime flag is set, and is stored as zero
//! otherwise, even when an edit carries a stale value from the previous row.

use crate::{
    core::{
        dates::{format_date, parse_date},
        sheet::{self, NO, Row, RowIndex, Sheet, SheetRecord, YES, yes_no},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::{info, warn};

/// Longest note accepted on a production entry
pub const MAX_NOTE_CHARS: usize = 50;

/// Derives the total of a production entry.
///
/// Overtime is ignored unless `overtime_flag` is set.
#[must_use]
pub fn compute_total(regular: u32, overtime_flag: bool, overtime: u32) -> u64 {
    u64::from(regular) + u64::from(effective_overtime(overtime_flag, overtime))
}

/// Overtime quantity that is actually stored: zero when the flag is off.
#[must_use]
pub const fn effective_overtime(overtime_flag: bool, overtime: u32) -> u32 {
    if overtime_flag { overtime } else { 0 }
}

/// One production figure, positioned in columns A-H of the production sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionEntry {
    /// Day of production
    pub date: NaiveDate,
    /// Sector (e.g. "Estamparia")
    pub sector: String,
    /// Subsector team inside the sector
    pub subsector: String,
    /// Units produced in regular hours
    pub regular_quantity: u32,
    /// Whether overtime was worked
    pub overtime_flag: bool,
    overtime_quantity: u32,
    total: u64,
    /// Free-text note, at most [`MAX_NOTE_CHARS`] characters
    pub note: String,
}

impl ProductionEntry {
    /// Builds an entry, deriving overtime and total.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the sector or subsector is blank or the
    /// note is too long.
    pub fn new(
        date: NaiveDate,
        sector: &str,
        subsector: &str,
        regular_quantity: u32,
        overtime_flag: bool,
        overtime_quantity: u32,
        note: &str,
    ) -> Result<Self> {
        if sector.trim().is_empty() || subsector.trim().is_empty() {
            return Err(Error::Validation {
                message: "sector and subsector are required".to_string(),
            });
        }
        if note.chars().count() > MAX_NOTE_CHARS {
            return Err(Error::Validation {
                message: format!("note must have at most {MAX_NOTE_CHARS} characters"),
            });
        }

        Ok(Self {
            date,
            sector: sector.trim().to_string(),
            subsector: subsector.trim().to_string(),
            regular_quantity,
            overtime_flag,
            overtime_quantity: effective_overtime(overtime_flag, overtime_quantity),
            total: compute_total(regular_quantity, overtime_flag, overtime_quantity),
            note: note.trim().to_string(),
        })
    }

    /// Units produced in overtime; zero when no overtime was worked.
    #[must_use]
    pub const fn overtime_quantity(&self) -> u32 {
        self.overtime_quantity
    }

    /// Regular plus overtime production.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}

impl SheetRecord for ProductionEntry {
    const SHEET: Sheet = Sheet::Production;

    fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.sector.clone(),
            self.subsector.clone(),
            self.regular_quantity.to_string(),
            yes_no(self.overtime_flag).to_string(),
            self.overtime_quantity.to_string(),
            self.total.to_string(),
            self.note.clone(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let date = parse_date(row.get(1))?;
        let regular = row.parse_u32(Self::SHEET, 4)?;
        let flag = row.parse_flag(Self::SHEET, 5, YES, NO)?;
        let overtime = if row.get(6).trim().is_empty() {
            0
        } else {
            row.parse_u32(Self::SHEET, 6)?
        };

        let entry = Self {
            date,
            sector: row.get(2).to_string(),
            subsector: row.get(3).to_string(),
            regular_quantity: regular,
            overtime_flag: flag,
            overtime_quantity: effective_overtime(flag, overtime),
            total: compute_total(regular, flag, overtime),
            note: row.get(8).to_string(),
        };

        if row.get(7).trim() != entry.total.to_string() {
            warn!(
                "Production row {} stores total '{}', recomputed as {}",
                row.index,
                row.get(7),
                entry.total
            );
        }
        Ok(entry)
    }
}

/// Appends a new production entry and returns its row.
pub async fn record_production<C>(db: &C, entry: &ProductionEntry) -> Result<RowIndex>
where
    C: ConnectionTrait + TransactionTrait,
{
    let row = sheet::append_record(db, entry).await?;
    info!(
        "Recorded production {} / {}: total {}",
        format_date(entry.date),
        entry.subsector,
        entry.total
    );
    Ok(row)
}

/// Finds the first entry for a day and subsector.
pub async fn find_production<C>(
    db: &C,
    date: NaiveDate,
    subsector: &str,
) -> Result<Option<(RowIndex, ProductionEntry)>>
where
    C: ConnectionTrait,
{
    let date_text = format_date(date);
    match sheet::find_by_key(db, Sheet::Production, &[(1, &date_text), (3, subsector)]).await? {
        Some(row) => Ok(Some((row.index, ProductionEntry::from_row(&row)?))),
        None => Ok(None),
    }
}

/// Rewrites the entry identified by (`date`, `subsector`) with `updated`.
///
/// # Errors
/// Returns [`Error::LookupMiss`] when no entry matches; nothing is written then.
pub async fn edit_production<C>(
    db: &C,
    date: NaiveDate,
    subsector: &str,
    updated: &ProductionEntry,
) -> Result<RowIndex>
where
    C: ConnectionTrait,
{
    let Some((row, _previous)) = find_production(db, date, subsector).await? else {
        return Err(Error::LookupMiss {
            entity: "production entry",
            key: format!("{} / {subsector}", format_date(date)),
        });
    };

    sheet::update_record(db, row, updated).await?;
    info!("Edited production entry on row {}", row);
    Ok(row)
}

/// Loads every production entry in row order.
pub async fn list_production<C>(db: &C) -> Result<Vec<ProductionEntry>>
where
    C: ConnectionTrait,
{
    Ok(sheet::load_records::<ProductionEntry, _>(db)
        .await?
        .into_iter()
        .map(|(_, entry)| entry)
        .collect())
}
