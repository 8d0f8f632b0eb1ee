use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::discount::DiscountPreview;
use crate::domain::entities::point_of_sale::PointOfSale;
use crate::domain::entities::product::Product;
use crate::domain::entities::query::ListParams;
use crate::domain::entities::transaction::{StatusScope, Transaction, TransactionStatus};
use crate::infra::sqlite::queries::{
    attach_invoice_to_transaction, authorize_discount_code, find_discount_code, is_expired,
    load_point_of_sale, query_products, query_transactions, transition_transaction,
    TransitionOutcome,
};
use crate::infra::sqlite::schema::init_db;
use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::fetcher::{FetchError, ListFetcher, PageResponse};
use crate::usecase::ports::repo::{InvoiceDocument, PortalRepository, RepoError};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

fn into_transaction(trx_id: &str, outcome: TransitionOutcome) -> Result<Transaction, RepoError> {
    match outcome {
        TransitionOutcome::Updated(trx) => Ok(trx),
        TransitionOutcome::NotFound => Err(RepoError::NotFound(format!("transaction {trx_id}"))),
        TransitionOutcome::InvalidState(status) => Err(RepoError::InvalidState {
            trx_id: trx_id.to_string(),
            status,
        }),
    }
}

impl PortalRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(|err| RepoError::Message(err.to_string()))
    }

    fn point_of_sale(&self, id: &str) -> Result<PointOfSale, RepoError> {
        load_point_of_sale(&self.db_path, id)
            .map_err(|err| RepoError::Message(err.to_string()))?
            .ok_or_else(|| RepoError::NotFound(format!("point of sale {id}")))
    }

    fn capture_transaction(&self, pos_id: &str, trx_id: &str) -> Result<Transaction, RepoError> {
        let outcome = transition_transaction(
            &self.db_path,
            pos_id,
            trx_id,
            &[TransactionStatus::Authorized],
            TransactionStatus::Captured,
        )
        .map_err(|err| RepoError::Message(err.to_string()))?;
        into_transaction(trx_id, outcome)
    }

    fn cancel_transaction(&self, pos_id: &str, trx_id: &str) -> Result<Transaction, RepoError> {
        let outcome = transition_transaction(
            &self.db_path,
            pos_id,
            trx_id,
            &[TransactionStatus::Authorized, TransactionStatus::Captured],
            TransactionStatus::Cancelled,
        )
        .map_err(|err| RepoError::Message(err.to_string()))?;
        into_transaction(trx_id, outcome)
    }

    fn attach_invoice(
        &self,
        pos_id: &str,
        trx_id: &str,
        document: InvoiceDocument,
    ) -> Result<Transaction, RepoError> {
        let file = document.file.to_string_lossy().into_owned();
        let outcome = attach_invoice_to_transaction(
            &self.db_path,
            pos_id,
            trx_id,
            document.kind.as_str(),
            &document.number,
            &file,
        )
        .map_err(|err| RepoError::Message(err.to_string()))?;
        into_transaction(trx_id, outcome)
    }

    fn preview_discount(&self, code: &str) -> Result<DiscountPreview, RepoError> {
        let record = find_discount_code(&self.db_path, code)
            .map_err(|err| RepoError::Message(err.to_string()))?
            .ok_or_else(|| RepoError::NotFound(code.to_string()))?;

        if record.trx_uuid.is_some() {
            return Err(RepoError::AlreadyAuthorized(code.to_string()));
        }
        let now = chrono::Local::now().naive_local();
        if is_expired(&record, now).map_err(|err| RepoError::Message(err.to_string()))? {
            return Err(RepoError::Expired(code.to_string()));
        }
        Ok(record.preview)
    }

    fn authorize_discount(&self, pos_id: &str, code: &str) -> Result<Transaction, RepoError> {
        // Re-checks expiry and prior authorization: the preview may be stale.
        self.preview_discount(code)?;
        let record = find_discount_code(&self.db_path, code)
            .map_err(|err| RepoError::Message(err.to_string()))?
            .ok_or_else(|| RepoError::NotFound(code.to_string()))?;
        authorize_discount_code(&self.db_path, pos_id, &record)
            .map_err(|err| RepoError::Message(err.to_string()))
    }
}

/// Transactions of one point of sale, limited to one status scope.
pub struct SqliteTransactionsFetcher {
    pub db_path: PathBuf,
    pub pos_id: String,
    pub scope: StatusScope,
}

#[async_trait]
impl ListFetcher<Transaction> for SqliteTransactionsFetcher {
    async fn fetch(&self, params: ListParams) -> Result<PageResponse<Transaction>, FetchError> {
        let db_path = self.db_path.clone();
        let pos_id = self.pos_id.clone();
        let scope = self.scope;
        run_blocking(move || query_transactions(&db_path, &pos_id, scope, &params))
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?
            .map_err(|err| FetchError::Backend(format!("{err:#}")))
    }
}

pub struct SqliteProductsFetcher {
    pub db_path: PathBuf,
}

#[async_trait]
impl ListFetcher<Product> for SqliteProductsFetcher {
    async fn fetch(&self, params: ListParams) -> Result<PageResponse<Product>, FetchError> {
        let db_path = self.db_path.clone();
        run_blocking(move || query_products(&db_path, &params))
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?
            .map_err(|err| FetchError::Backend(format!("{err:#}")))
    }
}
