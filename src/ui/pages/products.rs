use std::collections::BTreeMap;

use dioxus::prelude::*;
use tracing::warn;

use crate::domain::entities::page::MISSING_DATA_PLACEHOLDER;
use crate::domain::entities::product::Product;
use crate::domain::entities::query::{Filters, SortModel};
use crate::ui::components::alerts::Alerts;
use crate::ui::components::autocomplete::Autocomplete;
use crate::ui::components::data_table::DataTable;
use crate::ui::hooks::{run_list_trigger, use_auto_reset_banner, use_list};
use crate::ui::state::app_state::AppServices;
use crate::ui::state::banner::active_alerts;
use crate::ui::state::grid::{GridColumn, PageChange};
use crate::ui::state::search_box::{SearchOption, SearchResults};
use crate::usecase::services::list_orchestrator::{EmptyState, ListOptions, ListTrigger};

const PRODUCT_FILTER: &str = "productName";

fn product_columns() -> Vec<GridColumn<Product>> {
    vec![
        GridColumn::new("gtinCode", "Codice GTIN"),
        GridColumn::new("productName", "Prodotto"),
        GridColumn::new("category", "Categoria"),
        GridColumn::new("brand", "Marca"),
        GridColumn::new("energyClass", "Classe energetica").unsortable(),
    ]
}

fn product_filter(name: &str) -> Filters {
    Filters::from([(PRODUCT_FILTER.to_string(), name.to_string())])
}

fn to_option(product: &Product) -> SearchOption {
    SearchOption {
        value: product.gtin_code.clone(),
        label: product.product_name.clone(),
    }
}

#[component]
pub fn ProductsPage() -> Element {
    let services = use_context::<AppServices>();
    let products_fetcher = services.products.clone();
    let page_size = services.config.page_size;
    let (list, snapshot) = use_list(
        "products",
        move || products_fetcher,
        move || ListOptions {
            page_size,
            default_sort: Some(SortModel::asc("productName")),
            ..ListOptions::default()
        },
    );
    let fetch_error = use_signal(|| false);
    let mut results = use_signal(SearchResults::default);
    let mut detail = use_signal(|| None::<Product>);

    use_auto_reset_banner(vec![fetch_error], services.config.banner_delay);

    let list_for_mount = list.clone();
    use_effect(move || {
        let list = list_for_mount.clone();
        spawn(async move {
            run_list_trigger(list, ListTrigger::Mount, snapshot, fetch_error).await;
        });
    });

    let current = snapshot();
    let alerts = active_alerts(
        &BTreeMap::from([("errorFetchProducts".to_string(), fetch_error())]),
        &BTreeMap::from([(
            "errorFetchProducts".to_string(),
            "Non è stato possibile recuperare i prodotti.".to_string(),
        )]),
    );
    let empty_message = match current.empty_state() {
        Some(EmptyState::NeverSearched) => Some("Nessun prodotto disponibile."),
        Some(EmptyState::NoResults) => Some("Nessun prodotto corrisponde alla ricerca."),
        None => None,
    };

    let query = services.query.clone();
    let list_for_select = list.clone();
    let list_for_page = list.clone();
    let list_for_sort = list.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px;",
            h2 { "Prodotti" }
            Alerts { alerts }
            Autocomplete {
                results: results(),
                settings: services.search_settings(),
                placeholder: "Cerca per nome prodotto".to_string(),
                on_change_debounce: move |text: String| {
                    let query = query.clone();
                    spawn(async move {
                        match query.search_products(&text).await {
                            Ok(found) => {
                                let found = found.iter().map(to_option).collect();
                                results.with_mut(|results| results.supply(found));
                            }
                            Err(err) => {
                                warn!(error = %err, "product search failed");
                                results.with_mut(|results| results.supply(Vec::new()));
                            }
                        }
                    });
                },
                on_change: move |selected: Option<SearchOption>| {
                    let trigger = match selected {
                        Some(option) => ListTrigger::ApplyFilters(product_filter(&option.label)),
                        None => ListTrigger::ResetFilters(product_filter("")),
                    };
                    let list = list_for_select.clone();
                    spawn(async move {
                        run_list_trigger(list, trigger, snapshot, fetch_error).await;
                    });
                },
            }
            if let Some(message) = empty_message {
                div {
                    style: "padding: 24px; text-align: center; border: 1px dashed #ccc; border-radius: 8px; color: #555;",
                    "{message}"
                }
            }
            DataTable::<Product> {
                rows: current.rows.clone(),
                columns: product_columns(),
                pagination: current.pagination,
                total_elements: current.total_elements,
                sort: current.sort.clone(),
                loading: current.is_loading(),
                unique_field: "gtinCode".to_string(),
                on_pagination_change: move |change: PageChange| {
                    let list = list_for_page.clone();
                    spawn(async move {
                        run_list_trigger(list, ListTrigger::Paginate(change.into()), snapshot, fetch_error).await;
                    });
                },
                on_sort_change: move |model: SortModel| {
                    let list = list_for_sort.clone();
                    spawn(async move {
                        run_list_trigger(list, ListTrigger::Sort(Some(model)), snapshot, fetch_error).await;
                    });
                },
                on_row_action: move |product: Product| detail.set(Some(product)),
            }
            if let Some(product) = detail() {
                ProductDetail { product, on_close: move |_| detail.set(None) }
            }
        }
    }
}

#[component]
fn ProductDetail(product: Product, on_close: EventHandler<()>) -> Element {
    let brand = product.brand.clone().unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());
    let name = product.product_name.clone();
    let gtin = product.gtin_code.clone();
    let category = product.category.clone();
    let energy = product
        .energy_class
        .clone()
        .unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());

    rsx! {
        div {
            style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: grid; grid-template-columns: 180px 1fr; gap: 6px 12px;",
            strong { "Prodotto" } span { "{name}" }
            strong { "Codice GTIN" } span { "{gtin}" }
            strong { "Categoria" } span { "{category}" }
            strong { "Marca" } span { "{brand}" }
            strong { "Classe energetica" } span { "{energy}" }
            div {
                style: "grid-column: 1 / span 2; text-align: right;",
                button { onclick: move |_| on_close.call(()), "Chiudi" }
            }
        }
    }
}
