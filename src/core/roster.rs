//! Employee roster - staff, their sectors and their subsector teams.
//!
//! The roster sheet (`quadro`) holds one employee per row: name, sector,
//! subsector, job title and an active flag. Employees are never removed, only
//! marked inactive, so historical production and absences keep pointing at a
//! known name.
//!
//! Names are the identity key, and like every sheet lookup the first matching row
//! wins. Sector and subsector lists are derived from the employees on file in
//! first-seen order; there is no separate sector table. The embroidery sector is
//! listed like any other but is never offered as a work-order team.

use crate::{
    core::sheet::{self, Row, RowIndex, Sheet, SheetRecord},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

const ACTIVE: &str = "Verdadeiro";
const INACTIVE: &str = "Falso";

/// Sector that never receives work orders
pub const EMBROIDERY_SECTOR: &str = "BORDADO";

/// One roster entry (columns A-E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    /// Identity key; the first row with this name wins
    pub name: String,
    /// Sector, e.g. "Estamparia"
    pub sector: String,
    /// Subsector team
    pub subsector: String,
    /// Job title
    pub role: String,
    /// Whether the employee is still on staff
    pub active: bool,
}

impl Employee {
    /// A new, active employee.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the name or sector is blank.
    pub fn new(name: &str, sector: &str, subsector: &str, role: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "employee name is required".to_string(),
            });
        }
        if sector.trim().is_empty() {
            return Err(Error::Validation {
                message: "employee sector is required".to_string(),
            });
        }

        Ok(Self {
            name: name.trim().to_string(),
            sector: sector.trim().to_string(),
            subsector: subsector.trim().to_string(),
            role: role.trim().to_string(),
            active: true,
        })
    }
}

impl SheetRecord for Employee {
    const SHEET: Sheet = Sheet::Roster;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.sector.clone(),
            self.subsector.clone(),
            self.role.clone(),
            if self.active { ACTIVE } else { INACTIVE }.to_string(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.get(1).to_string(),
            sector: row.get(2).to_string(),
            subsector: row.get(3).to_string(),
            role: row.get(4).to_string(),
            active: row.parse_flag(Self::SHEET, 5, ACTIVE, INACTIVE)?,
        })
    }
}

/// Which part of the roster to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team<'a> {
    /// Everyone in a sector
    Sector(&'a str),
    /// Everyone in a subsector
    Subsector(&'a str),
}

/// Appends a new employee to the roster.
///
/// Duplicate names are accepted; later lookups and edits reach the first one.
///
/// # Errors
/// - [`Error::AppendConflict`] if the target row already holds data
/// - [`Error::Database`] if the store cannot be written
pub async fn add_employee<C>(db: &C, employee: &Employee) -> Result<RowIndex>
where
    C: ConnectionTrait + TransactionTrait,
{
    let row = sheet::append_record(db, employee).await?;
    info!("Added employee '{}' to {}", employee.name, employee.sector);
    Ok(row)
}

/// Rewrites the first employee named `name`. The stored name is kept.
///
/// # Errors
/// Returns [`Error::LookupMiss`] when nobody has that name.
pub async fn edit_employee<C>(
    db: &C,
    name: &str,
    sector: &str,
    subsector: &str,
    role: &str,
    active: bool,
) -> Result<RowIndex>
where
    C: ConnectionTrait,
{
    let Some(row) = sheet::find_by_key(db, Sheet::Roster, &[(1, name)]).await? else {
        return Err(Error::LookupMiss {
            entity: "employee",
            key: name.to_string(),
        });
    };

    let mut employee = Employee::new(name, sector, subsector, role)?;
    employee.name = row.get(1).to_string();
    employee.active = active;
    sheet::update_record(db, row.index, &employee).await?;
    info!("Edited employee '{}' (active: {})", employee.name, active);
    Ok(row.index)
}

/// Every employee in row order, inactive ones included.
///
/// # Errors
/// Returns [`Error::MalformedRow`] when a stored active flag is neither of the
/// accepted values, or [`Error::Database`] if the store cannot be read.
pub async fn list_employees<C>(db: &C) -> Result<Vec<Employee>>
where
    C: ConnectionTrait,
{
    Ok(sheet::load_records::<Employee, _>(db)
        .await?
        .into_iter()
        .map(|(_, employee)| employee)
        .collect())
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Distinct sectors in first-seen order.
///
/// Inactive employees still contribute their sector, so a sector does not vanish
/// from autocomplete while it has history.
///
/// # Errors
/// Same as [`list_employees`].
pub async fn sectors<C>(db: &C) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let employees = list_employees(db).await?;
    Ok(distinct(employees.iter().map(|e| e.sector.as_str())))
}

/// Distinct subsectors of one sector in first-seen order.
pub async fn subsectors<C>(db: &C, sector: &str) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let employees = list_employees(db).await?;
    Ok(distinct(
        employees
            .iter()
            .filter(|e| e.sector == sector)
            .map(|e| e.subsector.as_str()),
    ))
}

/// Distinct employee names of a sector or subsector.
pub async fn employees_in<C>(db: &C, team: Team<'_>) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let employees = list_employees(db).await?;
    Ok(distinct(
        employees
            .iter()
            .filter(|e| match team {
                Team::Sector(sector) => e.sector == sector,
                Team::Subsector(subsector) => e.subsector == subsector,
            })
            .map(|e| e.name.as_str()),
    ))
}

/// Sectors a work order can be assigned to: every sector except
/// [`EMBROIDERY_SECTOR`].
///
/// # Errors
/// Same as [`list_employees`].
pub async fn work_order_teams<C>(db: &C) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let mut teams = sectors(db).await?;
    teams.retain(|t| t != EMBROIDERY_SECTOR);
    Ok(teams)
}
