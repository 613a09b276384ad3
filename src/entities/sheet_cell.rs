//! Sheet cell entity - One cell of a positional sheet.
//!
//! Every sheet (production, roster, absence, work orders) is stored as a sparse
//! grid of cells addressed by 1-based `row`/`col` coordinates. A unique index on
//! (`sheet`, `row`, `col`) is created alongside the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sheet cell database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sheet_cells")]
pub struct Model {
    /// Unique identifier for the cell
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the sheet the cell belongs to (e.g. `"producao"`)
    pub sheet: String,
    /// 1-based row index; row 1 holds the header
    pub row: u32,
    /// 1-based column index (A = 1)
    pub col: u32,
    /// Cell text; blank cells are stored as empty strings or not at all
    pub value: String,
    /// When the cell was last written
    pub updated_at: DateTime,
}

/// `SheetCell` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
