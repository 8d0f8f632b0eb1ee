use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use rusqlite::types::Value;
use tracing::info;

use crate::infra::sqlite::schema::{init_db, open_connection};

/// CSV fixtures keyed by target table.
#[derive(Debug, Clone, Copy)]
pub struct SeedSources {
    pub point_of_sale: &'static str,
    pub products: &'static str,
    pub transactions: &'static str,
    pub discount_codes: &'static str,
}

impl SeedSources {
    pub fn bundled() -> Self {
        Self {
            point_of_sale: include_str!("../../../assets/seed/point_of_sale.csv"),
            products: include_str!("../../../assets/seed/products.csv"),
            transactions: include_str!("../../../assets/seed/transactions.csv"),
            discount_codes: include_str!("../../../assets/seed/discount_codes.csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub skipped: bool,
    pub points_of_sale: i64,
    pub products: i64,
    pub transactions: i64,
    pub discount_codes: i64,
}

const POINT_OF_SALE_COLUMNS: &[&str] = &[
    "id",
    "business_name",
    "vat_number",
    "address",
    "city",
    "contact_email",
    "website",
];
const PRODUCT_COLUMNS: &[&str] = &[
    "gtin_code",
    "product_name",
    "category",
    "brand",
    "energy_class",
];
const TRX_COLUMNS: &[&str] = &[
    "uuid",
    "trx_code",
    "point_of_sale_id",
    "fiscal_code",
    "status",
    "product_gtin",
    "product_name",
    "effective_amount_cents",
    "reward_amount_cents",
    "update_date",
    "invoice_kind",
    "invoice_number",
    "invoice_file",
];
const DISCOUNT_CODE_COLUMNS: &[&str] = &[
    "code",
    "fiscal_code",
    "product_gtin",
    "amount_cents",
    "reward_cents",
    "expires_at",
    "trx_uuid",
];

/// Empty cells become NULL, integers stay integers.
fn cell_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match raw.parse::<i64>() {
        Ok(number) if !raw.starts_with('0') || raw == "0" => Value::Integer(number),
        _ => Value::Text(raw.to_string()),
    }
}

fn import_table(
    tx: &rusqlite::Transaction<'_>,
    table: &str,
    allowed_columns: &[&str],
    csv_text: &str,
) -> Result<i64> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());
    let headers: StringRecord = reader
        .headers()
        .with_context(|| format!("failed to read headers for {table}"))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required for {table}")
    }
    if let Some(unknown) = headers
        .iter()
        .find(|header| !allowed_columns.contains(header))
    {
        anyhow::bail!("unexpected column {unknown} for {table}")
    }

    let column_list = headers.iter().collect::<Vec<_>>().join(", ");
    let placeholders = std::iter::repeat_n("?", headers.len())
        .collect::<Vec<_>>()
        .join(", ");
    let mut insert = tx
        .prepare(&format!(
            "INSERT INTO {table}({column_list}) VALUES ({placeholders})"
        ))
        .with_context(|| format!("failed to prepare insert for {table}"))?;

    let mut row_count = 0_i64;
    for record in reader.records() {
        let record = record.with_context(|| format!("failed to parse csv record for {table}"))?;
        let values = (0..headers.len())
            .map(|idx| cell_value(record.get(idx).unwrap_or("")))
            .collect::<Vec<_>>();
        insert
            .execute(rusqlite::params_from_iter(values))
            .with_context(|| format!("failed to insert row {row_count} into {table}"))?;
        row_count += 1;
    }

    Ok(row_count)
}

pub fn import_seed_to_sqlite(db_path: &Path, sources: &SeedSources) -> Result<SeedReport> {
    init_db(db_path)?;

    let mut conn = open_connection(db_path)?;
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM point_of_sale", [], |row| row.get(0))
        .context("failed to count points of sale")?;
    if existing > 0 {
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let tx = conn.transaction().context("failed to start transaction")?;
    let report = SeedReport {
        skipped: false,
        points_of_sale: import_table(&tx, "point_of_sale", POINT_OF_SALE_COLUMNS, sources.point_of_sale)?,
        products: import_table(&tx, "product", PRODUCT_COLUMNS, sources.products)?,
        transactions: import_table(&tx, "trx", TRX_COLUMNS, sources.transactions)?,
        discount_codes: import_table(
            &tx,
            "discount_code",
            DISCOUNT_CODE_COLUMNS,
            sources.discount_codes,
        )?,
    };
    tx.commit().context("failed to commit seed transaction")?;

    info!(
        points_of_sale = report.points_of_sale,
        products = report.products,
        transactions = report.transactions,
        discount_codes = report.discount_codes,
        "demo data imported"
    );
    Ok(report)
}
