//! Database configuration module for `ShopFloor`.
//!
//! This module handles `SQLite` connection setup and table creation using `SeaORM`.
//! The `sheet_cells` table is generated from the entity definition with
//! `Schema::create_table_from_entity`; the composite unique index over
//! (`sheet`, `row`, `col`) is what turns a racing append into a conflict instead of
//! a silent overwrite.

use crate::entities::{SheetCell, SheetCellColumn};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/shopfloor.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory holding the file of a `sqlite://` URL, if it names one.
fn sqlite_directory(url: &str) -> Option<&Path> {
    let path = url.strip_prefix("sqlite://")?.split('?').next()?;
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set. The
/// file's directory is created when missing.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(directory) = sqlite_directory(&database_url) {
        tokio::fs::create_dir_all(directory).await?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the `sheet_cells` table and its position index if they do not exist yet.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut cell_table = schema.create_table_from_entity(SheetCell);
    cell_table.if_not_exists();
    db.execute(builder.build(&cell_table)).await?;

    let position_index = Index::create()
        .name("idx_sheet_cells_position")
        .table(SheetCell)
        .col(SheetCellColumn::Sheet)
        .col(SheetCellColumn::Row)
        .col(SheetCellColumn::Col)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&position_index)).await?;

    info!("Sheet storage ready");
    Ok(())
}
