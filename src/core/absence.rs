//! Absence log (columns A-E of the absence sheet).

use crate::{
    core::{
        dates::{format_date, parse_date},
        sheet::{self, NO, Row, RowIndex, Sheet, SheetRecord, YES, yes_no},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::fmt;
use tracing::info;

/// Longest note accepted on an absence
pub const MAX_NOTE_CHARS: usize = 50;

/// Part of the day an employee missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    /// Morning
    Morning,
    /// Afternoon
    Afternoon,
    /// The whole day
    FullDay,
}

impl Shift {
    /// Stored text of the shift.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Matutino",
            Self::Afternoon => "Vespertino",
            Self::FullDay => "Dia inteiro",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        [Self::Morning, Self::Afternoon, Self::FullDay]
            .into_iter()
            .find(|s| s.as_str() == value.trim())
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One absence, positioned in columns A-E of the absence sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceEntry {
    /// Day missed
    pub date: NaiveDate,
    /// Roster name of the employee
    pub employee_name: String,
    /// Part of the day missed
    pub shift: Shift,
    /// Justified absences do not reduce individual production
    pub excused: bool,
    /// Free-text note
    pub note: String,
}

impl AbsenceEntry {
    /// # Errors
    /// Returns [`Error::Validation`] for a blank name or an over-long note.
    pub fn new(
        date: NaiveDate,
        employee_name: &str,
        shift: Shift,
        excused: bool,
        note: &str,
    ) -> Result<Self> {
        if employee_name.trim().is_empty() {
            return Err(Error::Validation {
                message: "employee name is required".to_string(),
            });
        }
        if note.chars().count() > MAX_NOTE_CHARS {
            return Err(Error::Validation {
                message: format!("note must have at most {MAX_NOTE_CHARS} characters"),
            });
        }
        Ok(Self {
            date,
            employee_name: employee_name.trim().to_string(),
            shift,
            excused,
            note: note.trim().to_string(),
        })
    }
}

impl SheetRecord for AbsenceEntry {
    const SHEET: Sheet = Sheet::Absence;

    fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            self.employee_name.clone(),
            self.shift.to_string(),
            yes_no(self.excused).to_string(),
            self.note.clone(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let shift = Shift::parse(row.get(3))
            .ok_or_else(|| row.malformed(Self::SHEET, format!("unknown shift '{}'", row.get(3))))?;
        Ok(Self {
            date: parse_date(row.get(1))?,
            employee_name: row.get(2).to_string(),
            shift,
            excused: row.parse_flag(Self::SHEET, 4, YES, NO)?,
            note: row.get(5).to_string(),
        })
    }
}

/// Appends an absence.
pub async fn record_absence<C>(db: &C, entry: &AbsenceEntry) -> Result<RowIndex>
where
    C: ConnectionTrait + TransactionTrait,
{
    let row = sheet::append_record(db, entry).await?;
    info!(
        "Recorded absence of '{}' on {}",
        entry.employee_name,
        format_date(entry.date)
    );
    Ok(row)
}

/// Rewrites the first absence matching (`date`, `employee_name`).
///
/// # Errors
/// Returns [`Error::LookupMiss`] when no absence matches.
pub async fn edit_absence<C>(
    db: &C,
    date: NaiveDate,
    employee_name: &str,
    updated: &AbsenceEntry,
) -> Result<RowIndex>
where
    C: ConnectionTrait,
{
    let date_text = format_date(date);
    let key = [(1, date_text.as_str()), (2, employee_name)];
    let Some(row) = sheet::find_by_key(db, Sheet::Absence, &key).await? else {
        return Err(Error::LookupMiss {
            entity: "absence",
            key: format!("{date_text} / {employee_name}"),
        });
    };

    sheet::update_record(db, row.index, updated).await?;
    info!("Edited absence on row {}", row.index);
    Ok(row.index)
}

/// Every absence in row order.
pub async fn list_absences<C>(db: &C) -> Result<Vec<AbsenceEntry>>
where
    C: ConnectionTrait,
{
    Ok(sheet::load_records::<AbsenceEntry, _>(db)
        .await?
        .into_iter()
        .map(|(_, entry)| entry)
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_edit_absence_rewrites_only_matching_row() -> Result<()> {
        let db = setup_sheets().await?;
        let ana = AbsenceEntry::new(date("10/03/2025"), "Ana", Shift::Morning, false, "")?;
        let bruno = AbsenceEntry::new(date("10/03/2025"), "Bruno", Shift::FullDay, false, "")?;
        record_absence(&db, &ana).await?;
        record_absence(&db, &bruno).await?;

        let updated =
            AbsenceEntry::new(date("10/03/2025"), "Ana", Shift::Afternoon, true, "atestado")?;
        let row = edit_absence(&db, date("10/03/2025"), "Ana", &updated).await?;
        assert_eq!(row, 2);

        let rows = sheet::data_rows(&db, Sheet::Absence).await?;
        assert_eq!(
            rows[0].values,
            vec!["10/03/2025", "Ana", "Vespertino", "Sim", "atestado"]
        );
        assert_eq!(
            rows[1].values,
            vec!["10/03/2025", "Bruno", "Dia inteiro", "Não", ""]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_missing_absence_is_lookup_miss() -> Result<()> {
        let db = setup_sheets().await?;
        let entry = AbsenceEntry::new(date("10/03/2025"), "Ana", Shift::Morning, false, "")?;
        let result = edit_absence(&db, date("11/03/2025"), "Ana", &entry).await;
        assert!(matches!(result, Err(Error::LookupMiss { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_absences_decodes_rows() -> Result<()> {
        let db = setup_sheets().await?;
        let entry = AbsenceEntry::new(date("01/04/2025"), "Davi", Shift::FullDay, true, "médico")?;
        record_absence(&db, &entry).await?;

        assert_eq!(list_absences(&db).await?, vec![entry]);
        Ok(())
    }

    #[test]
    fn test_note_limit() {
        let note = "n".repeat(MAX_NOTE_CHARS + 1);
        let result = AbsenceEntry::new(date("01/04/2025"), "Davi", Shift::FullDay, true, &note);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
