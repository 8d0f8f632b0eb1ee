use std::collections::BTreeMap;
use std::time::Duration;

use dioxus::prelude::*;

use crate::domain::entities::query::SortModel;
use crate::domain::entities::transaction::Transaction;
use crate::ui::components::alerts::Alerts;
use crate::ui::components::data_table::DataTable;
use crate::ui::components::filter_form::FilterFormView;
use crate::ui::hooks::{run_list_trigger, use_auto_reset_banner};
use crate::ui::state::banner::active_alerts;
use crate::ui::state::filter_form::{FilterField, FilterForm};
use crate::ui::state::grid::{GridColumn, PageChange};
use crate::usecase::services::list_orchestrator::{EmptyState, ListOrchestrator, ListTrigger};

const FETCH_ERROR_KEY: &str = "errorFetchTransactions";
const FETCH_ERROR_MESSAGE: &str =
    "Non è stato possibile recuperare le transazioni. Riprova più tardi.";

/// Filterable transaction list. `refresh` is a counter: every change after
/// mount asks for a refetch with the current query.
#[component]
pub fn TransactionsLayout(
    list: ListOrchestrator<Transaction>,
    fields: Vec<FilterField>,
    columns: Vec<GridColumn<Transaction>>,
    #[props(default)] refresh: u64,
    #[props(default)] external_state: BTreeMap<String, bool>,
    #[props(default)] alert_messages: BTreeMap<String, String>,
    banner_delay: Duration,
    empty_title: String,
    on_row_action: EventHandler<Transaction>,
) -> Element {
    let list_for_snapshot = list.clone();
    let snapshot = use_signal(move || list_for_snapshot.snapshot());
    let fields_for_form = fields.clone();
    let mut form = use_signal(move || FilterForm::new(&fields_for_form));
    let fetch_error = use_signal(|| false);

    use_auto_reset_banner(vec![fetch_error], banner_delay);

    let list_for_mount = list.clone();
    use_effect(move || {
        let list = list_for_mount.clone();
        spawn(async move {
            run_list_trigger(list, ListTrigger::Mount, snapshot, fetch_error).await;
        });
    });

    let list_for_refresh = list.clone();
    use_effect(use_reactive((&refresh,), move |(refresh,)| {
        if refresh == 0 {
            return;
        }
        let list = list_for_refresh.clone();
        spawn(async move {
            run_list_trigger(list, ListTrigger::Refresh, snapshot, fetch_error).await;
        });
    }));

    let current = snapshot();
    let show_filters = current.show_filter_form(form.read().has_values());
    let mut alert_state = external_state.clone();
    let mut messages = alert_messages.clone();
    alert_state.insert(FETCH_ERROR_KEY.to_string(), fetch_error());
    messages.insert(FETCH_ERROR_KEY.to_string(), FETCH_ERROR_MESSAGE.to_string());
    let alerts = active_alerts(&alert_state, &messages);
    let empty_message = match current.empty_state() {
        Some(EmptyState::NeverSearched) => Some(empty_title.clone()),
        Some(EmptyState::NoResults) => {
            Some("Nessun risultato corrisponde ai filtri impostati.".to_string())
        }
        None => None,
    };

    let list_for_apply = list.clone();
    let list_for_reset = list.clone();
    let list_for_page = list.clone();
    let list_for_sort = list.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px;",
            Alerts { alerts }
            if show_filters {
                FilterFormView {
                    fields: fields.clone(),
                    form,
                    on_apply: move |_| {
                        let applied = form.write().begin_submit();
                        let list = list_for_apply.clone();
                        spawn(async move {
                            run_list_trigger(list, ListTrigger::ApplyFilters(applied), snapshot, fetch_error).await;
                            form.write().end_submit();
                        });
                    },
                    on_reset: move |_| {
                        let cleared = form.write().reset_form();
                        let list = list_for_reset.clone();
                        spawn(async move {
                            run_list_trigger(list, ListTrigger::ResetFilters(cleared), snapshot, fetch_error).await;
                        });
                    },
                }
            }
            if current.is_loading() && current.rows.is_empty() {
                p { style: "color: #777;", "Caricamento in corso…" }
            }
            if let Some(message) = empty_message {
                div {
                    style: "padding: 24px; text-align: center; border: 1px dashed #ccc; border-radius: 8px; color: #555;",
                    "{message}"
                }
            }
            DataTable::<Transaction> {
                rows: current.rows.clone(),
                columns: columns.clone(),
                pagination: current.pagination,
                total_elements: current.total_elements,
                sort: current.sort.clone(),
                loading: current.is_loading(),
                unique_field: "uuid".to_string(),
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
                on_row_action: move |trx: Transaction| on_row_action.call(trx),
            }
        }
    }
}
