use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::entities::discount::DiscountPreview;
use crate::domain::entities::point_of_sale::PointOfSale;
use crate::domain::entities::product::Product;
use crate::domain::entities::query::{ListParams, SortModel};
use crate::domain::entities::transaction::{
    StatusScope, Transaction, TransactionStatus, DATE_TIME_FORMAT,
};
use crate::infra::sqlite::schema::open_connection;
use crate::usecase::ports::fetcher::PageResponse;

const TRX_COLUMNS: &str = "id, uuid, trx_code, fiscal_code, status, product_name, product_gtin, \
     effective_amount_cents, reward_amount_cents, update_date, invoice_file, invoice_number";

const PRODUCT_COLUMNS: &str = "gtin_code, product_name, category, brand, energy_class";

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Updated(Transaction),
    NotFound,
    InvalidState(TransactionStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCodeRecord {
    pub preview: DiscountPreview,
    pub trx_uuid: Option<String>,
}

/// Filter clauses and their bound values, built in lockstep.
#[derive(Default)]
struct WhereBuilder {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl WhereBuilder {
    fn push(&mut self, clause: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.params.extend(values);
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

pub fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format(DATE_TIME_FORMAT)
        .to_string()
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn read_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let status: String = row.get(4)?;
    let status = TransactionStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown transaction status: {status}").into(),
        )
    })?;
    let update_date: String = row.get(9)?;

    Ok(Transaction {
        id: row.get(0)?,
        uuid: row.get(1)?,
        trx_code: row.get(2)?,
        fiscal_code: row.get(3)?,
        status,
        product_name: row.get(5)?,
        product_gtin: row.get(6)?,
        effective_amount_cents: row.get(7)?,
        reward_amount_cents: row.get(8)?,
        update_date: parse_timestamp(9, &update_date)?,
        invoice_file: row.get(10)?,
        invoice_number: row.get(11)?,
    })
}

fn read_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        gtin_code: row.get(0)?,
        product_name: row.get(1)?,
        category: row.get(2)?,
        brand: row.get(3)?,
        energy_class: row.get(4)?,
    })
}

fn transaction_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "updateDate" => Some("update_date"),
        "fiscalCode" => Some("fiscal_code"),
        "productName" => Some("product_name"),
        "effectiveAmountCents" => Some("effective_amount_cents"),
        "rewardAmountCents" => Some("reward_amount_cents"),
        "status" => Some("status"),
        "trxCode" => Some("trx_code"),
        _ => None,
    }
}

fn product_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "gtinCode" => Some("gtin_code"),
        "productName" => Some("product_name"),
        "category" => Some("category"),
        "brand" => Some("brand"),
        _ => None,
    }
}

/// Resolves the wire sort against a whitelist. A stable tiebreaker is always appended.
fn order_by_sql(
    params: &ListParams,
    column_for: fn(&str) -> Option<&'static str>,
    tiebreaker: &str,
) -> Result<String> {
    let Some(raw) = params.sort.as_deref() else {
        return Ok(format!("{tiebreaker} ASC"));
    };
    let sort = SortModel::parse_wire(raw).ok_or_else(|| anyhow!("malformed sort: {raw}"))?;
    let column =
        column_for(&sort.field).ok_or_else(|| anyhow!("unsupported sort field: {}", sort.field))?;
    let direction = sort.direction.as_str().to_ascii_uppercase();
    Ok(format!("{column} {direction}, {tiebreaker} ASC"))
}

fn paged<T>(
    conn: &Connection,
    from_sql: &str,
    columns: &str,
    filter: &WhereBuilder,
    order_sql: &str,
    params: &ListParams,
    read: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> Result<PageResponse<T>> {
    if params.size == 0 {
        anyhow::bail!("page size must be greater than zero")
    }

    let where_sql = filter.sql();
    let count_sql = format!("SELECT COUNT(*) FROM {from_sql} WHERE {where_sql}");
    let total_elements: i64 = conn
        .query_row(
            &count_sql,
            rusqlite::params_from_iter(filter.params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered row count")?;

    let page_sql = format!(
        "SELECT {columns} FROM {from_sql} WHERE {where_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?"
    );
    let mut page_params = filter.params.clone();
    page_params.push(Value::Integer(i64::from(params.size)));
    page_params.push(Value::Integer(
        i64::from(params.page) * i64::from(params.size),
    ));

    let mut stmt = conn
        .prepare(&page_sql)
        .context("failed to prepare page query")?;
    let content = stmt
        .query_map(rusqlite::params_from_iter(page_params), read)
        .context("failed to query page")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect page rows")?;

    Ok(PageResponse::new(
        content,
        params.page,
        params.size,
        total_elements.max(0) as u64,
    ))
}

pub fn query_transactions(
    db_path: &Path,
    pos_id: &str,
    scope: StatusScope,
    params: &ListParams,
) -> Result<PageResponse<Transaction>> {
    let conn = open_connection(db_path)?;

    let mut filter = WhereBuilder::default();
    filter.push("point_of_sale_id = ?", [Value::Text(pos_id.to_string())]);

    let statuses = scope.statuses();
    let placeholders = std::iter::repeat_n("?", statuses.len())
        .collect::<Vec<_>>()
        .join(",");
    filter.push(
        format!("status IN ({placeholders})"),
        statuses
            .iter()
            .map(|status| Value::Text(status.as_str().to_string())),
    );

    if let Some(fiscal_code) = params.filter("fiscalCode") {
        filter.push(
            "fiscal_code LIKE ?",
            [Value::Text(format!("{}%", fiscal_code.to_ascii_uppercase()))],
        );
    }
    if let Some(raw_status) = params.filter("status") {
        let status = TransactionStatus::parse(raw_status)
            .ok_or_else(|| anyhow!("unknown status filter: {raw_status}"))?;
        filter.push("status = ?", [Value::Text(status.as_str().to_string())]);
    }
    if let Some(product_name) = params.filter("productName") {
        filter.push(
            "product_name LIKE ?",
            [Value::Text(format!("%{product_name}%"))],
        );
    }
    if let Some(trx_code) = params.filter("trxCode") {
        filter.push("trx_code = ?", [Value::Text(trx_code.to_ascii_uppercase())]);
    }

    let order_sql = order_by_sql(params, transaction_sort_column, "id")?;
    paged(
        &conn,
        "trx",
        TRX_COLUMNS,
        &filter,
        &order_sql,
        params,
        read_transaction,
    )
}

pub fn query_products(db_path: &Path, params: &ListParams) -> Result<PageResponse<Product>> {
    let conn = open_connection(db_path)?;

    let mut filter = WhereBuilder::default();
    if let Some(product_name) = params.filter("productName") {
        filter.push(
            "product_name LIKE ?",
            [Value::Text(format!("%{product_name}%"))],
        );
    }
    if let Some(category) = params.filter("category") {
        filter.push("category = ?", [Value::Text(category.to_string())]);
    }
    if let Some(gtin) = params.filter("gtinCode") {
        filter.push("gtin_code LIKE ?", [Value::Text(format!("{gtin}%"))]);
    }

    let order_sql = order_by_sql(params, product_sort_column, "gtin_code")?;
    paged(
        &conn,
        "product",
        PRODUCT_COLUMNS,
        &filter,
        &order_sql,
        params,
        read_product,
    )
}

pub fn load_transaction(conn: &Connection, uuid: &str) -> Result<Option<Transaction>> {
    conn.query_row(
        &format!("SELECT {TRX_COLUMNS} FROM trx WHERE uuid = ?1"),
        [uuid],
        read_transaction,
    )
    .optional()
    .with_context(|| format!("failed to load transaction {uuid}"))
}

fn current_status(conn: &Connection, pos_id: &str, uuid: &str) -> Result<Option<TransactionStatus>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT status FROM trx WHERE uuid = ?1 AND point_of_sale_id = ?2",
            params![uuid, pos_id],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read transaction status")?;

    raw.map(|status| {
        TransactionStatus::parse(&status).ok_or_else(|| anyhow!("unknown transaction status: {status}"))
    })
    .transpose()
}

pub fn transition_transaction(
    db_path: &Path,
    pos_id: &str,
    uuid: &str,
    allowed_from: &[TransactionStatus],
    to: TransactionStatus,
) -> Result<TransitionOutcome> {
    let conn = open_connection(db_path)?;
    let Some(status) = current_status(&conn, pos_id, uuid)? else {
        return Ok(TransitionOutcome::NotFound);
    };
    if !allowed_from.contains(&status) {
        return Ok(TransitionOutcome::InvalidState(status));
    }

    conn.execute(
        "UPDATE trx SET status = ?1, update_date = ?2 WHERE uuid = ?3",
        params![to.as_str(), now_timestamp(), uuid],
    )
    .context("failed to update transaction status")?;

    load_transaction(&conn, uuid)?
        .map(TransitionOutcome::Updated)
        .ok_or_else(|| anyhow!("transaction {uuid} vanished after update"))
}

pub fn attach_invoice_to_transaction(
    db_path: &Path,
    pos_id: &str,
    uuid: &str,
    kind: &str,
    number: &str,
    file: &str,
) -> Result<TransitionOutcome> {
    let conn = open_connection(db_path)?;
    let Some(status) = current_status(&conn, pos_id, uuid)? else {
        return Ok(TransitionOutcome::NotFound);
    };
    if status != TransactionStatus::Rewarded {
        return Ok(TransitionOutcome::InvalidState(status));
    }

    conn.execute(
        "UPDATE trx
         SET status = ?1, update_date = ?2, invoice_kind = ?3, invoice_number = ?4, invoice_file = ?5
         WHERE uuid = ?6",
        params![
            TransactionStatus::Invoiced.as_str(),
            now_timestamp(),
            kind,
            number,
            file,
            uuid
        ],
    )
    .context("failed to attach invoice")?;

    load_transaction(&conn, uuid)?
        .map(TransitionOutcome::Updated)
        .ok_or_else(|| anyhow!("transaction {uuid} vanished after update"))
}

pub fn find_discount_code(db_path: &Path, code: &str) -> Result<Option<DiscountCodeRecord>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT d.code, d.fiscal_code, p.product_name, d.product_gtin,
                d.amount_cents, d.reward_cents, d.expires_at, d.trx_uuid
         FROM discount_code d
         LEFT JOIN product p ON p.gtin_code = d.product_gtin
         WHERE d.code = ?1",
        [code],
        |row| {
            Ok(DiscountCodeRecord {
                preview: DiscountPreview {
                    code: row.get(0)?,
                    fiscal_code: row.get(1)?,
                    product_name: row.get(2)?,
                    product_gtin: row.get(3)?,
                    amount_cents: row.get(4)?,
                    reward_cents: row.get(5)?,
                    expires_at: row.get(6)?,
                },
                trx_uuid: row.get(7)?,
            })
        },
    )
    .optional()
    .context("failed to query discount code")
}

pub fn is_expired(record: &DiscountCodeRecord, now: NaiveDateTime) -> Result<bool> {
    let expires_at = NaiveDateTime::parse_from_str(&record.preview.expires_at, DATE_TIME_FORMAT)
        .with_context(|| format!("bad expiry on code {}", record.preview.code))?;
    Ok(expires_at <= now)
}

/// Creates the AUTHORIZED transaction and links it to the code in one transaction.
pub fn authorize_discount_code(
    db_path: &Path,
    pos_id: &str,
    record: &DiscountCodeRecord,
) -> Result<Transaction> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start authorization transaction")?;

    let preview = &record.preview;
    let uuid = format!("trx-{}", preview.code.to_ascii_lowercase());
    tx.execute(
        &format!(
            "INSERT INTO trx(uuid, trx_code, point_of_sale_id, fiscal_code, status, product_gtin,
                             product_name, effective_amount_cents, reward_amount_cents, update_date)
             VALUES (?1, ?2, ?3, ?4, '{}', ?5, ?6, ?7, ?8, ?9)",
            TransactionStatus::Authorized.as_str()
        ),
        params![
            uuid,
            preview.code,
            pos_id,
            preview.fiscal_code,
            preview.product_gtin,
            preview.product_name,
            preview.amount_cents,
            preview.reward_cents,
            now_timestamp()
        ],
    )
    .context("failed to insert authorized transaction")?;

    let updated = tx
        .execute(
            "UPDATE discount_code SET trx_uuid = ?1 WHERE code = ?2 AND trx_uuid IS NULL",
            params![uuid, preview.code],
        )
        .context("failed to link discount code")?;
    if updated != 1 {
        anyhow::bail!("discount code {} was authorized concurrently", preview.code);
    }

    tx.commit().context("failed to commit authorization")?;

    load_transaction(&conn, &uuid)?.ok_or_else(|| anyhow!("transaction {uuid} missing after insert"))
}

pub fn load_point_of_sale(db_path: &Path, id: &str) -> Result<Option<PointOfSale>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT id, business_name, vat_number, address, city, contact_email, website
         FROM point_of_sale
         WHERE id = ?1",
        [id],
        |row| {
            Ok(PointOfSale {
                id: row.get(0)?,
                business_name: row.get(1)?,
                vat_number: row.get(2)?,
                address: row.get(3)?,
                city: row.get(4)?,
                contact_email: row.get(5)?,
                website: row.get(6)?,
            })
        },
    )
    .optional()
    .context("failed to query point of sale")
}
