use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS point_of_sale (
            id            TEXT PRIMARY KEY,
            business_name TEXT NOT NULL,
            vat_number    TEXT NOT NULL,
            address       TEXT NOT NULL,
            city          TEXT NOT NULL,
            contact_email TEXT NOT NULL,
            website       TEXT
        );

        CREATE TABLE IF NOT EXISTS product (
            gtin_code     TEXT PRIMARY KEY,
            product_name  TEXT NOT NULL,
            category      TEXT NOT NULL,
            brand         TEXT,
            energy_class  TEXT
        );

        CREATE TABLE IF NOT EXISTS trx (
            id                     INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid                   TEXT NOT NULL UNIQUE,
            trx_code               TEXT NOT NULL,
            point_of_sale_id       TEXT NOT NULL,
            fiscal_code            TEXT NOT NULL,
            status                 TEXT NOT NULL,
            product_gtin           TEXT,
            product_name           TEXT,
            effective_amount_cents INTEGER NOT NULL,
            reward_amount_cents    INTEGER NOT NULL,
            update_date            TEXT NOT NULL,
            invoice_kind           TEXT,
            invoice_number         TEXT,
            invoice_file           TEXT,
            FOREIGN KEY (point_of_sale_id) REFERENCES point_of_sale(id)
        );

        CREATE TABLE IF NOT EXISTS discount_code (
            code          TEXT PRIMARY KEY,
            fiscal_code   TEXT NOT NULL,
            product_gtin  TEXT,
            amount_cents  INTEGER NOT NULL,
            reward_cents  INTEGER NOT NULL,
            expires_at    TEXT NOT NULL,
            trx_uuid      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_trx_pos_status
            ON trx(point_of_sale_id, status);

        CREATE INDEX IF NOT EXISTS idx_trx_pos_fiscal_code
            ON trx(point_of_sale_id, fiscal_code);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
