use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::transaction::Transaction;
use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::repo::{DocumentKind, InvoiceDocument, PortalRepository, RepoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionAction {
    Capture,
    Cancel,
    UploadInvoice,
    AuthorizeDiscount,
}

impl TransactionAction {
    /// Banner flag raised when the action fails.
    pub fn error_flag(self) -> &'static str {
        match self {
            TransactionAction::Capture => "errorCaptureTransaction",
            TransactionAction::Cancel => "errorCancelTransaction",
            TransactionAction::UploadInvoice => "errorUploadInvoice",
            TransactionAction::AuthorizeDiscount => "errorAuthorizeDiscount",
        }
    }

    /// Banner flag raised when the action succeeds.
    pub fn success_flag(self) -> &'static str {
        match self {
            TransactionAction::Capture => "transactionCaptured",
            TransactionAction::Cancel => "transactionCancelled",
            TransactionAction::UploadInvoice => "invoiceUploaded",
            TransactionAction::AuthorizeDiscount => "transactionAuthorized",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionAction::Capture => "capture",
            TransactionAction::Cancel => "cancel",
            TransactionAction::UploadInvoice => "upload_invoice",
            TransactionAction::AuthorizeDiscount => "authorize_discount",
        }
    }
}

impl std::fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{action} failed: {reason}")]
    Failed {
        action: TransactionAction,
        reason: String,
    },
    #[error("{0} rejected: invalid input")]
    Validation(TransactionAction),
}

impl ActionError {
    pub fn action(&self) -> TransactionAction {
        match self {
            ActionError::Failed { action, .. } | ActionError::Validation(action) => *action,
        }
    }

    pub(crate) fn failed(action: TransactionAction, reason: impl ToString) -> Self {
        ActionError::Failed {
            action,
            reason: reason.to_string(),
        }
    }
}

/// Per-field validation flags of the invoice upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvoiceFormErrors {
    pub document_number: bool,
    pub file: bool,
}

impl InvoiceFormErrors {
    pub fn any(&self) -> bool {
        self.document_number || self.file
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceForm {
    pub kind: DocumentKind,
    pub document_number: String,
    pub file: Option<PathBuf>,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self {
            kind: DocumentKind::Invoice,
            document_number: String::new(),
            file: None,
        }
    }
}

impl InvoiceForm {
    pub fn validate(&self) -> InvoiceFormErrors {
        let number = self.document_number.trim();
        InvoiceFormErrors {
            document_number: number.is_empty()
                || number.len() > 30
                || !number
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '/' | '-' | '_')),
            file: !self
                .file
                .as_ref()
                .and_then(|path| path.extension())
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf") || ext.eq_ignore_ascii_case("xml")),
        }
    }

    fn to_document(&self) -> Option<InvoiceDocument> {
        if self.validate().any() {
            return None;
        }
        Some(InvoiceDocument {
            kind: self.kind,
            number: self.document_number.trim().to_string(),
            file: self.file.clone()?,
        })
    }
}

/// Capture / cancel / invoice actions on a single transaction.
pub struct EditService {
    repo: Arc<dyn PortalRepository>,
    pos_id: String,
}

impl EditService {
    pub fn new(repo: Arc<dyn PortalRepository>, pos_id: impl Into<String>) -> Self {
        Self {
            repo,
            pos_id: pos_id.into(),
        }
    }

    pub async fn capture(&self, trx_id: &str) -> Result<Transaction, ActionError> {
        let repo = self.repo.clone();
        let pos_id = self.pos_id.clone();
        let trx = trx_id.to_string();
        self.run(TransactionAction::Capture, trx_id, move || {
            repo.capture_transaction(&pos_id, &trx)
        })
        .await
    }

    pub async fn cancel(&self, trx_id: &str) -> Result<Transaction, ActionError> {
        let repo = self.repo.clone();
        let pos_id = self.pos_id.clone();
        let trx = trx_id.to_string();
        self.run(TransactionAction::Cancel, trx_id, move || {
            repo.cancel_transaction(&pos_id, &trx)
        })
        .await
    }

    /// Validation runs locally first; nothing reaches the backend on bad input.
    pub async fn upload_invoice(
        &self,
        trx_id: &str,
        form: &InvoiceForm,
    ) -> Result<Transaction, ActionError> {
        let Some(document) = form.to_document() else {
            return Err(ActionError::Validation(TransactionAction::UploadInvoice));
        };
        let repo = self.repo.clone();
        let pos_id = self.pos_id.clone();
        let trx = trx_id.to_string();
        self.run(TransactionAction::UploadInvoice, trx_id, move || {
            repo.attach_invoice(&pos_id, &trx, document)
        })
        .await
    }

    async fn run<F>(
        &self,
        action: TransactionAction,
        trx_id: &str,
        call: F,
    ) -> Result<Transaction, ActionError>
    where
        F: FnOnce() -> Result<Transaction, RepoError> + Send + 'static,
    {
        let result = run_blocking(call)
            .await
            .map_err(|err| ActionError::failed(action, err))?
            .map_err(|err| ActionError::failed(action, err));
        match &result {
            Ok(updated) => info!(
                %action,
                trx_id,
                status = updated.status.as_str(),
                "transaction action completed"
            ),
            Err(err) => warn!(%action, trx_id, error = %err, "transaction action failed"),
        }
        result
    }
}
