//! Shared test utilities for `ShopFloor`.
//!
//! This module provides helpers for setting up in-memory sheet stores and building
//! records with sensible defaults.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    core::{
        dates::parse_date,
        sheet,
        work_order::{OrderStatus, Size, WorkOrder},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with the cell table but no headers.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory store whose four sheets carry their header row,
/// matching what startup produces. This is the standard setup for most tests.
pub async fn setup_sheets() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    sheet::ensure_headers(&db).await?;
    Ok(db)
}

/// Parses a `DD/MM/YYYY` literal.
#[must_use]
pub fn date(value: &str) -> NaiveDate {
    parse_date(value).expect("test date literal")
}

/// An open work order with sensible defaults.
///
/// # Defaults
/// * created 10/01/2025, delivery 20/01/2025
/// * design "flores", size M, team "Estamparia", empty note
#[must_use]
pub fn sample_order(code: u32, client: &str) -> WorkOrder {
    WorkOrder {
        code,
        created_date: date("10/01/2025"),
        delivery_date: date("20/01/2025"),
        design: "flores".to_string(),
        size: Size::M,
        client: client.to_string(),
        team: "Estamparia".to_string(),
        note: String::new(),
        status: OrderStatus::Open,
    }
}
