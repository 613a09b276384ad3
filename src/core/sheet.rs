//! Positional sheet storage - the record store adapter.
//!
//! Each sheet is a grid of text cells addressed by 1-based row and column. Row 1
//! holds the header; records start on row 2. New records are appended one past the
//! last non-empty cell of column A, and edits rewrite the full field range of a
//! single row. Lookups are linear scans in row order where the first match wins;
//! no uniqueness is enforced on identity keys.
//!
//! Appends run inside a transaction that counts, checks and writes, and the
//! unique (`sheet`, `row`, `col`) index makes a racing writer fail with
//! [`Error::AppendConflict`] rather than overwrite. The same error is returned when
//! a blank first cell makes the computed row land on existing data.

use crate::{
    entities::{SheetCell, sheet_cell},
    errors::{Error, Result},
};
use sea_orm::{
    PaginatorTrait, QueryOrder, Select, Set, SqlErr, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use tracing::{debug, info};

/// 1-based row index inside a sheet
pub type RowIndex = u32;

/// Row holding the column titles of every sheet
pub const HEADER_ROW: RowIndex = 1;

/// The four sheets of the shop workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    /// Daily production per subsector
    Production,
    /// Employee roster
    Roster,
    /// Absence log
    Absence,
    /// Work orders (OS)
    WorkOrder,
}

impl Sheet {
    /// Every sheet, in workbook order.
    pub const ALL: [Self; 4] = [Self::Production, Self::Roster, Self::Absence, Self::WorkOrder];

    /// Storage name of the sheet.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Production => "producao",
            Self::Roster => "quadro",
            Self::Absence => "falta",
            Self::WorkOrder => "ordens_servico",
        }
    }

    /// Column titles written to [`HEADER_ROW`].
    #[must_use]
    pub const fn header(self) -> &'static [&'static str] {
        match self {
            Self::Production => &[
                "DATA",
                "SETOR",
                "SUBSETOR",
                "PRODUCAO",
                "HORA EXTRA",
                "PRODUCAO HORA EXTRA",
                "TOTAL",
                "OBSERVACOES",
            ],
            Self::Roster => &["NOME", "SETOR", "SUBSETOR", "CARGO", "ATIVO"],
            Self::Absence => &["DATA", "NOME", "TURNO", "ABONAR?", "OBSERVACOES"],
            Self::WorkOrder => &[
                "Código OS",
                "Data Carimbo",
                "Data Entrega",
                "Estampa",
                "Tamanho",
                "Cliente",
                "Equipe",
                "Observação",
                "Status",
            ],
        }
    }

    /// Number of positional columns a record of this sheet occupies.
    #[must_use]
    pub const fn width(self) -> usize {
        self.header().len()
    }
}

/// One materialised row; blank cells come back as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of the row
    pub index: RowIndex,
    /// Cell values from column A onwards
    pub values: Vec<String>,
}

impl Row {
    /// Value of a 1-based column, or `""` past the end of the row.
    #[must_use]
    pub fn get(&self, col: u32) -> &str {
        usize::try_from(col)
            .ok()
            .and_then(|c| c.checked_sub(1))
            .and_then(|i| self.values.get(i))
            .map_or("", String::as_str)
    }

    /// Builds a [`Error::MalformedRow`] pointing at this row.
    #[must_use]
    pub fn malformed(&self, sheet: Sheet, message: impl Into<String>) -> Error {
        Error::MalformedRow {
            sheet: sheet.name(),
            row: self.index,
            message: message.into(),
        }
    }

    /// Parses a non-negative integer cell.
    pub fn parse_u32(&self, sheet: Sheet, col: u32) -> Result<u32> {
        let raw = self.get(col).trim();
        raw.parse::<u32>().map_err(|_| {
            self.malformed(
                sheet,
                format!("column {col} should hold a whole number, found '{raw}'"),
            )
        })
    }

    /// Parses a two-valued cell, e.g. `Sim`/`Não`.
    pub fn parse_flag(&self, sheet: Sheet, col: u32, truthy: &str, falsy: &str) -> Result<bool> {
        match self.get(col).trim() {
            v if v == truthy => Ok(true),
            v if v == falsy => Ok(false),
            other => Err(self.malformed(
                sheet,
                format!("column {col} should be '{truthy}' or '{falsy}', found '{other}'"),
            )),
        }
    }
}

/// Text of a `Sim`/`Não` cell.
#[must_use]
pub const fn yes_no(value: bool) -> &'static str {
    if value { YES } else { NO }
}

/// Affirmative value of `Sim`/`Não` cells
pub const YES: &str = "Sim";
/// Negative value of `Sim`/`Não` cells
pub const NO: &str = "Não";

/// A record that maps onto the positional columns of one sheet.
pub trait SheetRecord: Sized {
    /// Sheet the record lives in
    const SHEET: Sheet;

    /// Cell values from column A onwards.
    fn to_row(&self) -> Vec<String>;

    /// Decodes a stored row.
    fn from_row(row: &Row) -> Result<Self>;
}

fn cells_of(sheet: Sheet) -> Select<SheetCell> {
    SheetCell::find().filter(sheet_cell::Column::Sheet.eq(sheet.name()))
}

fn build_cells(sheet: Sheet, row: RowIndex, fields: &[String]) -> Result<Vec<sheet_cell::ActiveModel>> {
    let now = chrono::Utc::now().naive_utc();
    fields
        .iter()
        .enumerate()
        .map(|(offset, value)| {
            Ok(sheet_cell::ActiveModel {
                sheet: Set(sheet.name().to_string()),
                row: Set(row),
                col: Set(u32::try_from(offset)? + 1),
                value: Set(value.clone()),
                updated_at: Set(now),
                ..Default::default()
            })
        })
        .collect()
}

fn map_append_error(err: DbErr, sheet: Sheet, row: RowIndex) -> Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        Error::AppendConflict {
            sheet: sheet.name(),
            row,
        }
    } else {
        err.into()
    }
}

/// Computes the row the next append lands on: non-empty cells in column A, plus one.
///
/// The header counts as a filled cell, so on an initialised sheet the first record
/// goes to row 2. On a sheet without a header it goes to row 1.
pub async fn next_append_row<C>(db: &C, sheet: Sheet) -> Result<RowIndex>
where
    C: ConnectionTrait,
{
    let filled = cells_of(sheet)
        .filter(sheet_cell::Column::Col.eq(1u32))
        .filter(sheet_cell::Column::Value.ne(""))
        .count(db)
        .await?;
    Ok(RowIndex::try_from(filled)? + 1)
}

async fn row_is_occupied<C>(db: &C, sheet: Sheet, row: RowIndex) -> Result<bool>
where
    C: ConnectionTrait,
{
    let filled = cells_of(sheet)
        .filter(sheet_cell::Column::Row.eq(row))
        .filter(sheet_cell::Column::Value.ne(""))
        .count(db)
        .await?;
    Ok(filled > 0)
}

/// Appends one record and returns the row it was written to.
pub async fn append<C>(db: &C, sheet: Sheet, fields: Vec<String>) -> Result<RowIndex>
where
    C: ConnectionTrait + TransactionTrait,
{
    let placed = append_rows(db, sheet, vec![fields]).await?;
    placed.into_iter().next().ok_or_else(|| Error::Validation {
        message: "nothing was appended".to_string(),
    })
}

/// Appends several records on contiguous rows inside one transaction.
///
/// # Errors
/// - [`Error::Validation`] when there is nothing to write or a record has a blank
///   first cell (it would break the row count of later appends)
/// - [`Error::AppendConflict`] when a target row already holds data
pub async fn append_rows<C>(db: &C, sheet: Sheet, rows: Vec<Vec<String>>) -> Result<Vec<RowIndex>>
where
    C: ConnectionTrait + TransactionTrait,
{
    if rows.is_empty() {
        return Err(Error::Validation {
            message: format!("no rows to append to sheet '{}'", sheet.name()),
        });
    }
    if rows
        .iter()
        .any(|fields| fields.first().is_none_or(|first| first.trim().is_empty()))
    {
        return Err(Error::Validation {
            message: format!(
                "records appended to sheet '{}' need a value in column A",
                sheet.name()
            ),
        });
    }

    let txn = db.begin().await?;
    let first = next_append_row(&txn, sheet).await?;
    let mut placed = Vec::with_capacity(rows.len());

    for (offset, fields) in rows.iter().enumerate() {
        let row = first + RowIndex::try_from(offset)?;
        if row_is_occupied(&txn, sheet, row).await? {
            return Err(Error::AppendConflict {
                sheet: sheet.name(),
                row,
            });
        }

        // Blank leftovers would trip the position index
        SheetCell::delete_many()
            .filter(sheet_cell::Column::Sheet.eq(sheet.name()))
            .filter(sheet_cell::Column::Row.eq(row))
            .exec(&txn)
            .await?;

        SheetCell::insert_many(build_cells(sheet, row, fields)?)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| map_append_error(e, sheet, row))?;
        placed.push(row);
    }

    txn.commit().await?;
    info!(
        "Appended {} row(s) to '{}' starting at row {}",
        placed.len(),
        sheet.name(),
        first
    );
    Ok(placed)
}

/// Rewrites columns `1..=fields.len()` of one row.
///
/// Partial updates are not supported: callers always pass the full record.
pub async fn update<C>(db: &C, sheet: Sheet, row: RowIndex, fields: &[String]) -> Result<()>
where
    C: ConnectionTrait,
{
    if row == 0 {
        return Err(Error::Validation {
            message: "rows are numbered from 1".to_string(),
        });
    }
    if fields.is_empty() {
        return Err(Error::Validation {
            message: format!("no fields to write to row {row} of '{}'", sheet.name()),
        });
    }

    SheetCell::insert_many(build_cells(sheet, row, fields)?)
        .on_conflict(
            OnConflict::columns([
                sheet_cell::Column::Sheet,
                sheet_cell::Column::Row,
                sheet_cell::Column::Col,
            ])
            .update_columns([sheet_cell::Column::Value, sheet_cell::Column::UpdatedAt])
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Rewrote row {} of '{}'", row, sheet.name());
    Ok(())
}

/// Loads every non-blank row of a sheet, header included, in row order.
pub async fn read_rows<C>(db: &C, sheet: Sheet) -> Result<Vec<Row>>
where
    C: ConnectionTrait,
{
    let cells = cells_of(sheet)
        .order_by_asc(sheet_cell::Column::Row)
        .order_by_asc(sheet_cell::Column::Col)
        .all(db)
        .await?;

    let mut rows: Vec<Row> = Vec::new();
    for cell in cells {
        if rows.last().map(|r| r.index) != Some(cell.row) {
            rows.push(Row {
                index: cell.row,
                values: Vec::new(),
            });
        }
        if let Some(current) = rows.last_mut() {
            let slot = usize::try_from(cell.col)?.saturating_sub(1);
            if current.values.len() <= slot {
                current.values.resize(slot + 1, String::new());
            }
            current.values[slot] = cell.value;
        }
    }

    rows.retain(|row| row.values.iter().any(|v| !v.is_empty()));
    debug!("Loaded {} row(s) from '{}'", rows.len(), sheet.name());
    Ok(rows)
}

/// Loads the rows below the header.
pub async fn data_rows<C>(db: &C, sheet: Sheet) -> Result<Vec<Row>>
where
    C: ConnectionTrait,
{
    let mut rows = read_rows(db, sheet).await?;
    rows.retain(|row| row.index > HEADER_ROW);
    Ok(rows)
}

/// Returns the first data row accepted by `predicate`.
pub async fn find<C, P>(db: &C, sheet: Sheet, predicate: P) -> Result<Option<Row>>
where
    C: ConnectionTrait,
    P: Fn(&Row) -> bool,
{
    Ok(data_rows(db, sheet)
        .await?
        .into_iter()
        .find(|row| predicate(row)))
}

/// Returns the first data row whose cells equal every `(column, value)` pair.
pub async fn find_by_key<C>(db: &C, sheet: Sheet, key: &[(u32, &str)]) -> Result<Option<Row>>
where
    C: ConnectionTrait,
{
    find(db, sheet, |row| {
        key.iter().all(|(col, value)| row.get(*col) == *value)
    })
    .await
}

/// Writes the header row when row 1 is empty. Returns whether it wrote anything.
pub async fn ensure_header<C>(db: &C, sheet: Sheet) -> Result<bool>
where
    C: ConnectionTrait,
{
    if row_is_occupied(db, sheet, HEADER_ROW).await? {
        return Ok(false);
    }
    let header: Vec<String> = sheet.header().iter().map(ToString::to_string).collect();
    update(db, sheet, HEADER_ROW, &header).await?;
    info!("Initialised header of sheet '{}'", sheet.name());
    Ok(true)
}

/// Initialises the header row of every sheet.
pub async fn ensure_headers<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for sheet in Sheet::ALL {
        ensure_header(db, sheet).await?;
    }
    Ok(())
}

/// Decodes every data row of `T`'s sheet, keeping the row index of each record.
pub async fn load_records<T, C>(db: &C) -> Result<Vec<(RowIndex, T)>>
where
    T: SheetRecord,
    C: ConnectionTrait,
{
    data_rows(db, T::SHEET)
        .await?
        .iter()
        .map(|row| Ok((row.index, T::from_row(row)?)))
        .collect()
}

/// Appends a record to its sheet.
pub async fn append_record<T, C>(db: &C, record: &T) -> Result<RowIndex>
where
    T: SheetRecord,
    C: ConnectionTrait + TransactionTrait,
{
    append(db, T::SHEET, record.to_row()).await
}

/// Rewrites the row of an existing record.
pub async fn update_record<T, C>(db: &C, row: RowIndex, record: &T) -> Result<()>
where
    T: SheetRecord,
    C: ConnectionTrait,
{
    update(db, T::SHEET, row, &record.to_row()).await
}
