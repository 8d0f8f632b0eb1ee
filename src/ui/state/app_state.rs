use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::config::PortalConfig;
use crate::domain::entities::product::Product;
use crate::domain::entities::transaction::{StatusScope, Transaction};
use crate::infra::sqlite::repo::{SqliteProductsFetcher, SqliteRepo, SqliteTransactionsFetcher};
use crate::ui::state::search_box::SearchSettings;
use crate::usecase::ports::fetcher::ListFetcher;
use crate::usecase::ports::repo::PortalRepository;
use crate::usecase::ports::session::SessionContext;
use crate::usecase::services::discount_service::DiscountService;
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::query_service::QueryService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Products,
    InProgress,
    Processed,
    AcceptDiscount,
    Profile,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Products,
        Route::AcceptDiscount,
        Route::InProgress,
        Route::Processed,
        Route::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Route::Products => "Prodotti",
            Route::InProgress => "Pagamenti in corso",
            Route::Processed => "Pagamenti gestiti",
            Route::AcceptDiscount => "Accetta buono sconto",
            Route::Profile => "Dati punto vendita",
        }
    }
}

/// Services shared by every page, provided once through the context API.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<PortalConfig>,
    pub session: SessionContext,
    pub repo: Arc<dyn PortalRepository>,
    pub products: Arc<dyn ListFetcher<Product>>,
    pub in_progress: Arc<dyn ListFetcher<Transaction>>,
    pub processed: Arc<dyn ListFetcher<Transaction>>,
    pub query: Arc<QueryService>,
    pub edit: Arc<EditService>,
    pub discounts: Arc<DiscountService>,
}

impl AppServices {
    pub fn new(config: PortalConfig, session: SessionContext) -> Self {
        let db_path = config.db_path.clone();
        let pos_id = config.pos_id.clone();
        let repo: Arc<dyn PortalRepository> = Arc::new(SqliteRepo {
            db_path: db_path.clone(),
        });
        let products: Arc<dyn ListFetcher<Product>> = Arc::new(SqliteProductsFetcher {
            db_path: db_path.clone(),
        });
        let transactions = |scope| -> Arc<dyn ListFetcher<Transaction>> {
            Arc::new(SqliteTransactionsFetcher {
                db_path: db_path.clone(),
                pos_id: pos_id.clone(),
                scope,
            })
        };

        Self {
            in_progress: transactions(StatusScope::InProgress),
            processed: transactions(StatusScope::Processed),
            query: Arc::new(QueryService::new(products.clone())),
            edit: Arc::new(EditService::new(repo.clone(), pos_id.clone())),
            discounts: Arc::new(DiscountService::new(
                repo.clone(),
                session.clone(),
                pos_id.clone(),
            )),
            products,
            repo,
            session,
            config: Arc::new(config),
        }
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: self.config.debounce,
            min_chars: self.config.search_min_chars,
        }
    }
}

pub struct AppState {
    pub route: Signal<Route>,
    pub status: Signal<String>,
    pub busy: Signal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            route: use_signal(|| Route::Products),
            status: use_signal(|| "Pronto".to_string()),
            busy: use_signal(|| false),
        }
    }
}
