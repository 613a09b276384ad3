//! Entity module - Contains the SeaORM entity definitions for the database.
//! The sheets themselves are positional grids, so a single cell entity backs all of them.

pub mod sheet_cell;

pub use sheet_cell::{Column as SheetCellColumn, Entity as SheetCell, Model as SheetCellModel};
