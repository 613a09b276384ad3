//! Production reports - monthly dashboard figures and individual production.
//!
//! The functions here are pure aggregations over loaded records; the caller
//! loads entries once and picks the period. Only [`production_periods`] touches
//! the store, to find the months that have data.
//!
//! Two figures are produced:
//! - the monthly report sums TOTAL (regular plus overtime) per sector, per day
//!   and per subsector, keeping sectors and subsectors in first-seen order
//! - individual production sums regular quantities only. An employee is credited
//!   with their subsector's production except on days they missed without an
//!   excuse.
//!
//! The text helpers at the bottom turn these numbers into the share bars and
//! `12.345`-style quantities shown in Discord embeds.

use crate::{
    core::{
        absence::AbsenceEntry,
        dates::{Period, available_periods},
        production::ProductionEntry,
        sheet::{self, Sheet},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use std::collections::BTreeMap;

/// Figures of one sector in a month, all based on TOTAL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorReport {
    /// Sector name
    pub sector: String,
    /// Sum of the month
    pub total: u64,
    /// Sum per day, oldest first
    pub daily: Vec<(NaiveDate, u64)>,
    /// Sum per subsector, in first-seen order
    pub subsectors: Vec<(String, u64)>,
}

/// Production of a month broken down by sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    /// Month covered
    pub period: Period,
    /// Sum over every sector
    pub total: u64,
    /// Sectors in first-seen order
    pub sectors: Vec<SectorReport>,
}

fn add_to<K: PartialEq>(sums: &mut Vec<(K, u64)>, key: K, amount: u64) {
    match sums.iter_mut().find(|(k, _)| *k == key) {
        Some((_, sum)) => *sum += amount,
        None => sums.push((key, amount)),
    }
}

/// Builds the dashboard figures of `period`.
///
/// Entries outside the month are ignored. A sector with no entries in the month
/// does not appear at all, so an empty `sectors` list means nothing was recorded.
/// Daily sums are keyed by date and returned oldest first.
#[must_use]
pub fn monthly_production_report(entries: &[ProductionEntry], period: Period) -> MonthlyReport {
    let mut sectors: Vec<(String, BTreeMap<NaiveDate, u64>, Vec<(String, u64)>)> = Vec::new();

    for entry in entries.iter().filter(|e| period.contains(e.date)) {
        let index = match sectors.iter().position(|(s, _, _)| *s == entry.sector) {
            Some(index) => index,
            None => {
                sectors.push((entry.sector.clone(), BTreeMap::new(), Vec::new()));
                sectors.len() - 1
            }
        };
        let (_, daily, subsectors) = &mut sectors[index];
        *daily.entry(entry.date).or_insert(0) += entry.total();
        add_to(subsectors, entry.subsector.clone(), entry.total());
    }

    let sectors: Vec<SectorReport> = sectors
        .into_iter()
        .map(|(sector, daily, subsectors)| SectorReport {
            total: daily.values().sum(),
            sector,
            daily: daily.into_iter().collect(),
            subsectors,
        })
        .collect();

    MonthlyReport {
        period,
        total: sectors.iter().map(|s| s.total).sum(),
        sectors,
    }
}

/// Production credited to one employee in a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndividualProduction {
    /// Regular production of the whole subsector
    pub team_total: u64,
    /// Team production minus the days of unexcused absences
    pub employee_total: u64,
    /// Days left out of the employee figure, oldest first
    pub excluded_days: Vec<NaiveDate>,
}

/// Regular (PRODUCAO) figures of `subsector` in `period`, for the team and for
/// `employee`.
///
/// Days on which the employee had an unexcused absence do not count towards the
/// employee figure; they are listed in `excluded_days` instead. Excused absences
/// and overtime have no effect. Absences are matched on the exact employee name.
///
/// # Arguments
/// * `entries` - Every production entry, any period
/// * `absences` - Every absence entry, any period
/// * `employee` - Name as stored in the roster
/// * `subsector` - Team whose production is credited
/// * `period` - Month to report on
#[must_use]
pub fn individual_production(
    entries: &[ProductionEntry],
    absences: &[AbsenceEntry],
    employee: &str,
    subsector: &str,
    period: Period,
) -> IndividualProduction {
    let mut unexcused: Vec<NaiveDate> = absences
        .iter()
        .filter(|a| a.employee_name == employee && !a.excused)
        .map(|a| a.date)
        .collect();
    unexcused.sort_unstable();
    unexcused.dedup();

    let mut result = IndividualProduction {
        team_total: 0,
        employee_total: 0,
        excluded_days: Vec::new(),
    };
    for entry in entries
        .iter()
        .filter(|e| e.subsector == subsector && period.contains(e.date))
    {
        let regular = u64::from(entry.regular_quantity);
        result.team_total += regular;
        if unexcused.binary_search(&entry.date).is_ok() {
            if !result.excluded_days.contains(&entry.date) {
                result.excluded_days.push(entry.date);
            }
        } else {
            result.employee_total += regular;
        }
    }
    result.excluded_days.sort_unstable();
    result
}

/// Months present in the production sheet, newest first.
///
/// # Errors
/// Returns [`crate::errors::Error::MalformedDate`] on a stored date that is not
/// `DD/MM/YYYY` rather than skipping the row, or
/// [`crate::errors::Error::Database`] if the sheet cannot be read.
pub async fn production_periods<C>(db: &C) -> Result<Vec<Period>>
where
    C: ConnectionTrait,
{
    let rows = sheet::data_rows(db, Sheet::Production).await?;
    available_periods(rows.iter().map(|row| row.get(1)))
}

/// Percentage of `part` in `whole`; 0 when `whole` is 0.
#[must_use]
pub fn share_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let share = part as f64 / whole as f64 * 100.0;
    share
}

/// Creates a text-based share bar like: `[████░░░░░░] 40.0%`
///
/// # Arguments
/// * `percent` - Share as a percentage (0-100)
/// * `bar_length` - Number of characters in the bar (default: 10)
#[must_use]
pub fn format_share_bar(percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percent.clamp(0.0, 100.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {percent:.1}%", "█".repeat(filled), "░".repeat(empty))
}

/// Formats a quantity with `.` as thousands separator, e.g. `12.345`.
#[must_use]
pub fn format_quantity(quantity: u64) -> String {
    let digits = quantity.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{absence::Shift, production::record_production},
        errors::Error,
        test_utils::*,
    };

    fn entry(day: &str, sector: &str, subsector: &str, regular: u32, overtime: u32) -> ProductionEntry {
        ProductionEntry::new(date(day), sector, subsector, regular, overtime > 0, overtime, "")
            .unwrap()
    }

    fn march() -> Period {
        Period::parse("3/2025").unwrap()
    }

    #[test]
    fn test_monthly_report_groups_by_sector_day_and_subsector() {
        let entries = vec![
            entry("03/03/2025", "Estamparia", "A", 100, 10),
            entry("01/03/2025", "Estamparia", "B", 50, 0),
            entry("03/03/2025", "Estamparia", "B", 20, 0),
            entry("01/03/2025", "Costura", "Reta", 30, 0),
            entry("28/02/2025", "Estamparia", "A", 999, 0),
        ];

        let report = monthly_production_report(&entries, march());
        assert_eq!(report.total, 210);
        assert_eq!(report.sectors.len(), 2);

        let estamparia = &report.sectors[0];
        assert_eq!(estamparia.sector, "Estamparia");
        assert_eq!(estamparia.total, 180);
        assert_eq!(
            estamparia.daily,
            vec![(date("01/03/2025"), 50), (date("03/03/2025"), 130)]
        );
        assert_eq!(
            estamparia.subsectors,
            vec![("A".to_string(), 110), ("B".to_string(), 70)]
        );
        assert_eq!(report.sectors[1].total, 30);
    }

    #[test]
    fn test_monthly_report_of_empty_month() {
        let report = monthly_production_report(&[], march());
        assert_eq!(report.total, 0);
        assert!(report.sectors.is_empty());
    }

    #[test]
    fn test_individual_production_excludes_unexcused_days() {
        let entries = vec![
            entry("10/03/2025", "Estamparia", "A", 100, 40),
            entry("11/03/2025", "Estamparia", "A", 80, 0),
            entry("12/03/2025", "Estamparia", "A", 60, 0),
            entry("12/03/2025", "Estamparia", "B", 500, 0),
            entry("10/04/2025", "Estamparia", "A", 700, 0),
        ];
        let absences = vec![
            AbsenceEntry::new(date("10/03/2025"), "Ana", Shift::FullDay, false, "").unwrap(),
            AbsenceEntry::new(date("12/03/2025"), "Ana", Shift::Morning, true, "").unwrap(),
            AbsenceEntry::new(date("11/03/2025"), "Bruno", Shift::FullDay, false, "").unwrap(),
        ];

        let ana = individual_production(&entries, &absences, "Ana", "A", march());
        assert_eq!(ana.team_total, 240);
        assert_eq!(ana.employee_total, 140);
        assert_eq!(ana.excluded_days, vec![date("10/03/2025")]);

        let edu = individual_production(&entries, &absences, "Edu", "A", march());
        assert_eq!(edu.employee_total, edu.team_total);
        assert!(edu.excluded_days.is_empty());
    }

    #[tokio::test]
    async fn test_production_periods_newest_first() -> Result<()> {
        let db = setup_sheets().await?;
        for day in ["05/01/2025", "10/03/2025", "06/01/2025"] {
            record_production(&db, &entry(day, "Estamparia", "A", 1, 0)).await?;
        }
        let shown: Vec<String> = production_periods(&db)
            .await?
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(shown, vec!["3/2025", "1/2025"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_production_periods_fail_on_malformed_date() -> Result<()> {
        let db = setup_sheets().await?;
        let values = ["2025/01/05", "Estamparia", "A", "1", "Não", "0", "1", ""]
            .iter()
            .map(ToString::to_string)
            .collect();
        sheet::append(&db, Sheet::Production, values).await?;
        assert!(matches!(
            production_periods(&db).await,
            Err(Error::MalformedDate { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_share_bar() {
        assert_eq!(format_share_bar(40.0, None), "[████░░░░░░] 40.0%");
        assert_eq!(format_share_bar(100.0, None), "[██████████] 100.0%");
        assert_eq!(format_share_bar(0.0, Some(5)), "[░░░░░] 0.0%");
        assert_eq!(share_percent(1, 4), 25.0);
        assert_eq!(share_percent(5, 0), 0.0);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(0), "0");
        assert_eq!(format_quantity(999), "999");
        assert_eq!(format_quantity(1000), "1.000");
        assert_eq!(format_quantity(1_234_567), "1.234.567");
    }
}
