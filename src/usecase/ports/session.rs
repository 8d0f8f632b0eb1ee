//! Per-session state shared across pages.
//!
//! One `SessionContext` is created at startup and handed down the component
//! tree. All mutation happens on the UI thread between event handlers, the
//! lock only makes the handle `Send` for spawned blocking work.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::domain::entities::point_of_sale::PointOfSale;

/// Raised after a discount is authorized, consumed by the in-progress list.
pub const TRANSACTION_AUTHORIZED_FLAG: &str = "transactionAuthorized";

#[derive(Debug, Default)]
struct SessionInner {
    token: Option<String>,
    initiative_id: Option<String>,
    point_of_sale: Option<PointOfSale>,
    flags: BTreeMap<String, bool>,
    storage: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionInner>>,
}

impl PartialEq for SessionContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.inner.write().token = token;
    }

    pub fn initiative_id(&self) -> Option<String> {
        self.inner.read().initiative_id.clone()
    }

    pub fn set_initiative_id(&self, initiative_id: impl Into<String>) {
        self.inner.write().initiative_id = Some(initiative_id.into());
    }

    pub fn point_of_sale(&self) -> Option<PointOfSale> {
        self.inner.read().point_of_sale.clone()
    }

    pub fn set_point_of_sale(&self, point_of_sale: PointOfSale) {
        self.inner.write().point_of_sale = Some(point_of_sale);
    }

    pub fn flag(&self, name: &str) -> bool {
        self.inner.read().flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&self, name: &str, value: bool) {
        self.inner.write().flags.insert(name.to_string(), value);
    }

    /// Reads a flag and lowers it in one step.
    pub fn take_flag(&self, name: &str) -> bool {
        self.inner.write().flags.remove(name).unwrap_or(false)
    }

    pub fn storage_get(&self, key: &str) -> Option<String> {
        self.inner.read().storage.get(key).cloned()
    }

    pub fn storage_set(&self, key: &str, value: String) {
        self.inner.write().storage.insert(key.to_string(), value);
    }

    pub fn storage_remove(&self, key: &str) {
        self.inner.write().storage.remove(key);
    }

    pub fn store_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(value)?;
        self.storage_set(key, json);
        Ok(())
    }

    /// Corrupt entries are dropped rather than surfaced.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage_get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "discarding unreadable session entry");
                self.storage_remove(key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::discount::{DiscountDraft, DISCOUNT_COUPON_KEY};

    #[test]
    fn clones_share_the_same_session() {
        let session = SessionContext::new();
        let other = session.clone();

        other.set_token(Some("bearer".to_string()));
        other.set_flag(TRANSACTION_AUTHORIZED_FLAG, true);

        assert_eq!(session.token().as_deref(), Some("bearer"));
        assert_eq!(session, other);
        assert!(session.take_flag(TRANSACTION_AUTHORIZED_FLAG));
        assert!(!other.flag(TRANSACTION_AUTHORIZED_FLAG));
    }

    #[test]
    fn json_entries_round_trip_and_bad_entries_are_dropped() {
        let session = SessionContext::new();
        let draft = DiscountDraft {
            code: "AB12CD34".to_string(),
            preview: None,
        };

        session
            .store_json(DISCOUNT_COUPON_KEY, &draft)
            .expect("draft should serialize");
        assert_eq!(session.load_json::<DiscountDraft>(DISCOUNT_COUPON_KEY), Some(draft));

        session.storage_set(DISCOUNT_COUPON_KEY, "{not json".to_string());
        assert_eq!(session.load_json::<DiscountDraft>(DISCOUNT_COUPON_KEY), None);
        assert_eq!(session.storage_get(DISCOUNT_COUPON_KEY), None);
    }
}
