use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

mod app;
mod config;
mod logging;

mod domain {
    pub mod entities {
        pub mod discount;
        pub mod page;
        pub mod point_of_sale;
        pub mod product;
        pub mod query;
        pub mod transaction;
    }
}

mod usecase {
    pub mod ports {
        pub mod fetcher;
        pub mod repo;
        pub mod session;
    }
    pub mod services {
        pub mod discount_service;
        pub mod edit_service;
        pub mod import_service;
        pub mod list_orchestrator;
        pub mod query_service;
    }
}

mod infra {
    pub mod import {
        pub mod csv;
    }
    pub mod sqlite {
        pub mod queries;
        pub mod repo;
        pub mod schema;
    }
}

mod platform {
    pub mod desktop {
        pub mod blocking;
    }
}

mod ui {
    pub mod components {
        pub mod alerts;
        pub mod autocomplete;
        pub mod data_table;
        pub mod filter_form;
        pub mod transactions_layout;
    }
    pub mod hooks;
    pub mod pages {
        pub mod accept_discount;
        pub mod products;
        pub mod profile;
        pub mod transactions;
    }
    pub mod state {
        pub mod app_state;
        pub mod banner;
        pub mod filter_form;
        pub mod grid;
        pub mod search_box;
    }
}

#[cfg(test)]
mod tests;

use crate::config::PortalConfig;
use crate::usecase::services::import_service::ImportService;

fn main() -> Result<()> {
    let config = PortalConfig::from_env()?;
    logging::init(&config);

    let seeding = ImportService::new(config.db_path.clone()).seed_demo_data();
    match seeding {
        Ok(report) => info!(?report, db_path = %config.db_path.display(), "database ready"),
        Err(err) => error!(error = ?err, db_path = %config.db_path.display(), "failed to seed demo data"),
    }

    let webview_data_dir = ensure_webview_data_dir(config.data_dir())?;

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Portale Esercenti"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(config)
        .launch(app::App);
    Ok(())
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

#[cfg(test)]
mod startup_tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn webview_dir_is_created_under_the_data_dir() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let base = std::env::temp_dir().join(format!("esercente-webview-{nanos}"));

        let created = ensure_webview_data_dir(&base).expect("webview dir should be created");

        assert!(created.is_dir());
        assert!(created.starts_with(&base));
        fs::remove_dir_all(&base).expect("should cleanup temp dir");
    }
}
