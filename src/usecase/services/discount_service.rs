use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::discount::{
    is_valid_code_format, normalize_code, DiscountDraft, DiscountPreview, DISCOUNT_COUPON_KEY,
};
use crate::domain::entities::transaction::Transaction;
use crate::platform::desktop::blocking::run_blocking;
use crate::usecase::ports::repo::{PortalRepository, RepoError};
use crate::usecase::ports::session::{SessionContext, TRANSACTION_AUTHORIZED_FLAG};
use crate::usecase::services::edit_service::{ActionError, TransactionAction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("invalid discount code format")]
    InvalidFormat,
    #[error("discount code not found or expired")]
    CodeNotFound,
    #[error("discount code already authorized")]
    AlreadyAuthorized,
    #[error("discount preview failed: {0}")]
    Backend(String),
}

impl PreviewError {
    /// Shown next to the code input instead of the generic banner.
    pub fn is_field_error(&self) -> bool {
        !matches!(self, PreviewError::Backend(_))
    }
}

impl From<RepoError> for PreviewError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) | RepoError::Expired(_) => PreviewError::CodeNotFound,
            RepoError::AlreadyAuthorized(_) => PreviewError::AlreadyAuthorized,
            other => PreviewError::Backend(other.to_string()),
        }
    }
}

/// Two-step "accept discount" flow: preview the code, then authorize it.
/// The draft lives in the session so it survives page changes.
pub struct DiscountService {
    repo: Arc<dyn PortalRepository>,
    session: SessionContext,
    pos_id: String,
}

impl DiscountService {
    pub fn new(
        repo: Arc<dyn PortalRepository>,
        session: SessionContext,
        pos_id: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            session,
            pos_id: pos_id.into(),
        }
    }

    pub fn draft(&self) -> Option<DiscountDraft> {
        self.session.load_json(DISCOUNT_COUPON_KEY)
    }

    pub fn discard(&self) {
        self.session.storage_remove(DISCOUNT_COUPON_KEY);
    }

    pub async fn preview(&self, raw_code: &str) -> Result<DiscountPreview, PreviewError> {
        let code = normalize_code(raw_code);
        if !is_valid_code_format(&code) {
            return Err(PreviewError::InvalidFormat);
        }

        let repo = self.repo.clone();
        let lookup = code.clone();
        let preview = run_blocking(move || repo.preview_discount(&lookup))
            .await
            .map_err(|err| PreviewError::Backend(err.to_string()))?
            .map_err(PreviewError::from);

        let preview = match preview {
            Ok(preview) => preview,
            Err(err) => {
                warn!(code = %code, error = %err, "discount preview rejected");
                return Err(err);
            }
        };

        let draft = DiscountDraft {
            code,
            preview: Some(preview.clone()),
        };
        if let Err(err) = self.session.store_json(DISCOUNT_COUPON_KEY, &draft) {
            warn!(error = %err, "failed to store discount draft");
        }
        Ok(preview)
    }

    pub async fn authorize(&self) -> Result<Transaction, ActionError> {
        let action = TransactionAction::AuthorizeDiscount;
        let Some(code) = self
            .draft()
            .filter(|draft| draft.preview.is_some())
            .map(|draft| draft.code)
        else {
            return Err(ActionError::Validation(action));
        };

        let repo = self.repo.clone();
        let pos_id = self.pos_id.clone();
        let lookup = code.clone();
        let trx = run_blocking(move || repo.authorize_discount(&pos_id, &lookup))
            .await
            .map_err(|err| ActionError::failed(action, err))?
            .map_err(|err| ActionError::failed(action, err))?;

        self.discard();
        self.session.set_flag(TRANSACTION_AUTHORIZED_FLAG, true);
        info!(code = %code, trx_id = %trx.uuid, "discount authorized");
        Ok(trx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_backend_errors_use_the_banner() {
        assert!(PreviewError::from(RepoError::NotFound("X".to_string())).is_field_error());
        assert!(PreviewError::from(RepoError::Expired("X".to_string())).is_field_error());
        assert!(PreviewError::from(RepoError::AlreadyAuthorized("X".to_string())).is_field_error());
        assert!(PreviewError::InvalidFormat.is_field_error());
        assert!(!PreviewError::from(RepoError::Message("disk I/O".to_string())).is_field_error());
    }
}
