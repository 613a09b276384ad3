//! Work orders (OS): opening, closing and printing.
//!
//! One submission opens one to three orders with contiguous codes, starting one
//! above the highest code on the sheet. Orders are never deleted; closing flips
//! the status cell from `Aberto` to `Fechado`.

use crate::{
    assets::{ImageResolver, ResolvedImage},
    core::{
        dates::{format_date, parse_date},
        sheet::{self, Row, RowIndex, Sheet, SheetRecord},
    },
    errors::{Error, Result},
    print::{self, ArtifactStore, LayoutWarning, Slip},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::{collections::HashMap, fmt};
use tracing::{debug, info};

/// Longest note accepted on a work order
pub const MAX_NOTE_CHARS: usize = 200;

/// Most orders printed on one page
pub const MAX_ORDERS_PER_SUBMISSION: usize = 3;

/// Garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    /// Pequeno
    P,
    /// Médio
    M,
    /// Grande
    G,
    /// Extra grande
    GG,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 4] = [Self::P, Self::M, Self::G, Self::GG];

    /// Stored text of the size.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P => "P",
            Self::M => "M",
            Self::G => "G",
            Self::GG => "GG",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether work on an order is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Aberto
    Open,
    /// Fechado
    Closed,
}

impl OrderStatus {
    /// Stored text of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Aberto",
            Self::Closed => "Fechado",
        }
    }
}

/// A stored work order (columns A-I).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    /// Sequential code
    pub code: u32,
    /// Day the order was opened
    pub created_date: NaiveDate,
    /// Promised delivery day
    pub delivery_date: NaiveDate,
    /// Design name
    pub design: String,
    /// Garment size
    pub size: Size,
    /// Client name
    pub client: String,
    /// Sector responsible for the order
    pub team: String,
    /// Free-text note
    pub note: String,
    /// Open or closed
    pub status: OrderStatus,
}

impl SheetRecord for WorkOrder {
    const SHEET: Sheet = Sheet::WorkOrder;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.code.to_string(),
            format_date(self.created_date),
            format_date(self.delivery_date),
            self.design.clone(),
            self.size.to_string(),
            self.client.clone(),
            self.team.clone(),
            self.note.clone(),
            self.status.as_str().to_string(),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        let size = Size::parse(row.get(5))
            .ok_or_else(|| row.malformed(Self::SHEET, format!("unknown size '{}'", row.get(5))))?;
        // Rows written before the status column existed count as open
        let status = match row.get(9).trim() {
            "" | "Aberto" => OrderStatus::Open,
            "Fechado" => OrderStatus::Closed,
            other => return Err(row.malformed(Self::SHEET, format!("unknown status '{other}'"))),
        };

        Ok(Self {
            code: row.parse_u32(Self::SHEET, 1)?,
            created_date: parse_date(row.get(2))?,
            delivery_date: parse_date(row.get(3))?,
            design: row.get(4).to_string(),
            size,
            client: row.get(6).to_string(),
            team: row.get(7).to_string(),
            note: row.get(8).to_string(),
            status,
        })
    }
}

/// The fields of one order as collected from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderRequest {
    /// Promised delivery day, not before today
    pub delivery_date: NaiveDate,
    /// Design name, also the image to print
    pub design: String,
    /// Garment size
    pub size: Size,
    /// Client name
    pub client: String,
    /// Sector doing the work
    pub team: String,
    /// At most [`MAX_NOTE_CHARS`] characters
    pub note: String,
}

impl WorkOrderRequest {
    fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.client.trim().is_empty() {
            return Err(Error::Validation {
                message: "client name is required".to_string(),
            });
        }
        if self.design.trim().is_empty() {
            return Err(Error::Validation {
                message: "design is required".to_string(),
            });
        }
        if self.note.chars().count() > MAX_NOTE_CHARS {
            return Err(Error::Validation {
                message: format!("note must have at most {MAX_NOTE_CHARS} characters"),
            });
        }
        if self.delivery_date < today {
            return Err(Error::Validation {
                message: format!(
                    "delivery date {} is before today ({})",
                    format_date(self.delivery_date),
                    format_date(today)
                ),
            });
        }
        Ok(())
    }

    fn into_order(self, code: u32, today: NaiveDate) -> WorkOrder {
        WorkOrder {
            code,
            created_date: today,
            delivery_date: self.delivery_date,
            design: self.design.trim().to_string(),
            size: self.size,
            client: self.client.trim().to_string(),
            team: self.team.trim().to_string(),
            note: self.note.trim().to_string(),
            status: OrderStatus::Open,
        }
    }
}

/// Code the next order will get: the highest stored code plus one, or 1.
pub async fn next_code<C>(db: &C) -> Result<u32>
where
    C: ConnectionTrait,
{
    let mut highest = 0;
    for row in sheet::data_rows(db, Sheet::WorkOrder).await? {
        highest = highest.max(row.parse_u32(Sheet::WorkOrder, 1)?);
    }
    highest.checked_add(1).ok_or_else(|| Error::Validation {
        message: "work order codes exhausted".to_string(),
    })
}

/// Opens 1 to 3 orders with contiguous codes in one transaction.
///
/// # Errors
/// - [`Error::Validation`] for an empty or oversized batch, or an invalid field;
///   nothing is written then
/// - [`Error::AppendConflict`] when the sheet changed underneath the append
pub async fn open_work_orders<C>(
    db: &C,
    requests: Vec<WorkOrderRequest>,
    today: NaiveDate,
) -> Result<Vec<WorkOrder>>
where
    C: ConnectionTrait + TransactionTrait,
{
    if requests.is_empty() || requests.len() > MAX_ORDERS_PER_SUBMISSION {
        return Err(Error::Validation {
            message: format!(
                "a submission holds 1 to {MAX_ORDERS_PER_SUBMISSION} work orders, got {}",
                requests.len()
            ),
        });
    }
    for request in &requests {
        request.validate(today)?;
    }

    let txn = db.begin().await?;
    let base = next_code(&txn).await?;
    let orders = requests
        .into_iter()
        .enumerate()
        .map(|(offset, request)| Ok(request.into_order(base + u32::try_from(offset)?, today)))
        .collect::<Result<Vec<_>>>()?;

    sheet::append_rows(&txn, Sheet::WorkOrder, orders.iter().map(WorkOrder::to_row).collect())
        .await?;
    txn.commit().await?;

    info!("Opened work orders {}..={}", base, base + u32::try_from(orders.len())? - 1);
    Ok(orders)
}

/// Marks an open order as closed.
///
/// # Errors
/// - [`Error::LookupMiss`] when no order has this code
/// - [`Error::OrderNotOpen`] when the order is already closed
pub async fn close_work_order<C>(db: &C, code: u32) -> Result<RowIndex>
where
    C: ConnectionTrait,
{
    let key = code.to_string();
    let Some(row) = sheet::find_by_key(db, Sheet::WorkOrder, &[(1, &key)]).await? else {
        return Err(Error::LookupMiss {
            entity: "work order",
            key,
        });
    };

    let mut order = WorkOrder::from_row(&row)?;
    if order.status != OrderStatus::Open {
        return Err(Error::OrderNotOpen { code });
    }
    order.status = OrderStatus::Closed;
    sheet::update_record(db, row.index, &order).await?;
    info!("Closed work order {}", code);
    Ok(row.index)
}

/// Every order in row order.
pub async fn list_work_orders<C>(db: &C) -> Result<Vec<WorkOrder>>
where
    C: ConnectionTrait,
{
    Ok(sheet::load_records::<WorkOrder, _>(db)
        .await?
        .into_iter()
        .map(|(_, order)| order)
        .collect())
}

/// Orders still open.
pub async fn list_open_work_orders<C>(db: &C) -> Result<Vec<WorkOrder>>
where
    C: ConnectionTrait,
{
    let mut orders = list_work_orders(db).await?;
    orders.retain(|o| o.status == OrderStatus::Open);
    Ok(orders)
}

/// Outcome of a printed submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Orders that were opened
    pub orders: Vec<WorkOrder>,
    /// File name of the print
    pub artifact_name: String,
    /// Where the print was stored
    pub location: String,
    /// PDF bytes, e.g. for attaching to a reply
    pub pdf: Vec<u8>,
    /// Non-fatal layout problems
    pub warnings: Vec<LayoutWarning>,
}

/// Opens the orders and prints them on one page.
///
/// Images are resolved before anything is written, so a transport failure leaves
/// the sheet untouched. A missing image only produces a warning.
pub async fn submit_work_orders<C>(
    db: &C,
    resolver: &ImageResolver,
    store: &dyn ArtifactStore,
    requests: Vec<WorkOrderRequest>,
    today: NaiveDate,
) -> Result<Submission>
where
    C: ConnectionTrait + TransactionTrait,
{
    let mut images: HashMap<String, Option<ResolvedImage>> = HashMap::new();
    for request in &requests {
        let design = request.design.trim();
        if !images.contains_key(design) {
            let image = resolver.resolve(design).await?;
            debug!("Design '{}' resolved: {}", design, image.is_some());
            images.insert(design.to_string(), image);
        }
    }

    let orders = open_work_orders(db, requests, today).await?;

    let slips: Vec<Slip<'_>> = orders
        .iter()
        .map(|order| Slip {
            order,
            image: images.get(&order.design).and_then(Option::as_ref),
        })
        .collect();
    let rendered = print::render(&slips)?;

    let artifact_name = print::artifact_name(&orders);
    let location = store.store(&artifact_name, &rendered.bytes).await?;

    Ok(Submission {
        orders,
        artifact_name,
        location,
        pdf: rendered.bytes,
        warnings: rendered.warnings,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        assets::{LocalImageSource, tests::png_bytes},
        print::LocalArtifactStore,
        test_utils::*,
    };

    fn request(client: &str, design: &str) -> WorkOrderRequest {
        WorkOrderRequest {
            delivery_date: date("20/01/2025"),
            design: design.to_string(),
            size: Size::G,
            client: client.to_string(),
            team: "Estamparia".to_string(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_first_code_is_one() -> Result<()> {
        let db = setup_sheets().await?;
        assert_eq!(next_code(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_codes_are_contiguous_for_each_batch_size() -> Result<()> {
        let db = setup_sheets().await?;
        let today = date("10/01/2025");
        let mut expected_base = 1;

        for k in 1..=3 {
            let requests = (0..k).map(|i| request(&format!("C{i}"), "flores")).collect();
            let orders = open_work_orders(&db, requests, today).await?;
            let codes: Vec<u32> = orders.iter().map(|o| o.code).collect();
            let expected: Vec<u32> = (expected_base..expected_base + k).collect();
            assert_eq!(codes, expected);
            expected_base += k;
        }

        assert_eq!(list_work_orders(&db).await?.len(), 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_next_code_follows_highest_code() -> Result<()> {
        let db = setup_sheets().await?;
        let today = date("10/01/2025");
        let mut order = request("Ana", "flores").into_order(10, today);
        sheet::append_record(&db, &order).await?;
        order.code = 4;
        sheet::append_record(&db, &order).await?;

        assert_eq!(next_code(&db).await?, 11);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_batches_write_nothing() -> Result<()> {
        let db = setup_sheets().await?;
        let today = date("10/01/2025");

        let four = (0..4).map(|_| request("Ana", "flores")).collect();
        assert!(matches!(
            open_work_orders(&db, four, today).await,
            Err(Error::Validation { .. })
        ));
        assert!(open_work_orders(&db, Vec::new(), today).await.is_err());

        let mut late = request("Ana", "flores");
        late.delivery_date = date("09/01/2025");
        let batch = vec![request("Bia", "flores"), late];
        assert!(matches!(
            open_work_orders(&db, batch, today).await,
            Err(Error::Validation { .. })
        ));

        let mut blank = request(" ", "flores");
        blank.note = "x".repeat(MAX_NOTE_CHARS);
        assert!(open_work_orders(&db, vec![blank], today).await.is_err());

        let mut wordy = request("Ana", "flores");
        wordy.note = "x".repeat(MAX_NOTE_CHARS + 1);
        assert!(open_work_orders(&db, vec![wordy], today).await.is_err());

        assert!(list_work_orders(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_delivery_today_is_accepted() -> Result<()> {
        let db = setup_sheets().await?;
        let today = date("20/01/2025");
        let orders = open_work_orders(&db, vec![request("Ana", "flores")], today).await?;
        assert_eq!(orders[0].created_date, today);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_work_order_flow() -> Result<()> {
        let db = setup_sheets().await?;
        let today = date("10/01/2025");
        open_work_orders(&db, vec![request("Ana", "a"), request("Bia", "b")], today).await?;

        let row = close_work_order(&db, 2).await?;
        assert_eq!(row, 3);
        let stored = sheet::find_by_key(&db, Sheet::WorkOrder, &[(1, "2")]).await?.unwrap();
        assert_eq!(stored.get(9), "Fechado");

        assert!(matches!(
            close_work_order(&db, 2).await,
            Err(Error::OrderNotOpen { code: 2 })
        ));
        assert!(matches!(
            close_work_order(&db, 99).await,
            Err(Error::LookupMiss { .. })
        ));

        let open: Vec<u32> = list_open_work_orders(&db).await?.iter().map(|o| o.code).collect();
        assert_eq!(open, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_prints_and_stores() -> Result<()> {
        let db = setup_sheets().await?;
        let designs = tempfile::tempdir().unwrap();
        std::fs::write(designs.path().join("flores.png"), png_bytes(4, 4, [200, 0, 0, 255]))?;
        let output = tempfile::tempdir().unwrap();

        let resolver = ImageResolver::new().with_source(LocalImageSource::new(designs.path()));
        let store = LocalArtifactStore::new(output.path());
        let requests = vec![
            request("Ana", "flores"),
            request("Bia", "caveira"),
            request("Ana", "flores"),
        ];

        let submission =
            submit_work_orders(&db, &resolver, &store, requests, date("10/01/2025")).await?;

        assert_eq!(submission.artifact_name, "OS_1_Ana_Bia.pdf");
        assert!(output.path().join("OS_1_Ana_Bia.pdf").exists());
        assert_eq!(
            submission.warnings,
            vec![LayoutWarning::MissingImage {
                code: 2,
                design: "caveira".to_string()
            }]
        );
        assert_eq!(
            submission.orders.iter().map(|o| o.code).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        Ok(())
    }

    #[test]
    fn test_row_without_status_counts_as_open() {
        let row = Row {
            index: 2,
            values: ["1", "10/01/2025", "20/01/2025", "flores", "GG", "Ana", "Estamparia", ""]
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        let order = WorkOrder::from_row(&row).unwrap();
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.size, Size::GG);
    }
}
