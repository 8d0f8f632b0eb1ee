use std::path::PathBuf;

use crate::domain::entities::discount::DiscountPreview;
use crate::domain::entities::point_of_sale::PointOfSale;
use crate::domain::entities::transaction::{Transaction, TransactionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Message(String),
    NotFound(String),
    Expired(String),
    AlreadyAuthorized(String),
    InvalidState {
        trx_id: String,
        status: TransactionStatus,
    },
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Message(message) => write!(f, "{message}"),
            RepoError::NotFound(what) => write!(f, "not found: {what}"),
            RepoError::Expired(code) => write!(f, "discount code expired: {code}"),
            RepoError::AlreadyAuthorized(code) => {
                write!(f, "discount code already authorized: {code}")
            }
            RepoError::InvalidState { trx_id, status } => {
                write!(f, "transaction {trx_id} is {}", status.as_str())
            }
        }
    }
}

impl std::error::Error for RepoError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Invoice,
    CreditNote,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INVOICE",
            DocumentKind::CreditNote => "CREDIT_NOTE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Fattura",
            DocumentKind::CreditNote => "Nota di credito",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub kind: DocumentKind,
    pub number: String,
    pub file: PathBuf,
}

/// Write side of the backend plus the lookups that are not paginated lists.
pub trait PortalRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn point_of_sale(&self, id: &str) -> Result<PointOfSale, RepoError>;

    fn capture_transaction(&self, pos_id: &str, trx_id: &str) -> Result<Transaction, RepoError>;
    fn cancel_transaction(&self, pos_id: &str, trx_id: &str) -> Result<Transaction, RepoError>;
    fn attach_invoice(
        &self,
        pos_id: &str,
        trx_id: &str,
        document: InvoiceDocument,
    ) -> Result<Transaction, RepoError>;

    fn preview_discount(&self, code: &str) -> Result<DiscountPreview, RepoError>;
    fn authorize_discount(&self, pos_id: &str, code: &str) -> Result<Transaction, RepoError>;
}
