use std::collections::BTreeMap;
use std::path::PathBuf;

use dioxus::prelude::*;
use rfd::FileDialog;

use crate::domain::entities::page::MISSING_DATA_PLACEHOLDER;
use crate::domain::entities::query::{SortModel, SortSynonyms};
use crate::domain::entities::transaction::{
    format_cents, StatusScope, Transaction, DATE_TIME_FORMAT,
};
use crate::ui::components::transactions_layout::TransactionsLayout;
use crate::ui::hooks::use_auto_reset_banner;
use crate::ui::state::app_state::AppServices;
use crate::ui::state::filter_form::{FilterField, SelectOption};
use crate::ui::state::grid::GridColumn;
use crate::usecase::ports::repo::DocumentKind;
use crate::usecase::ports::session::TRANSACTION_AUTHORIZED_FLAG;
use crate::usecase::services::edit_service::{InvoiceForm, InvoiceFormErrors, TransactionAction};
use crate::usecase::services::list_orchestrator::{ListOptions, ListOrchestrator};

fn effective_amount(trx: &Transaction) -> String {
    format_cents(trx.effective_amount_cents)
}

fn reward_amount(trx: &Transaction) -> String {
    format_cents(trx.reward_amount_cents)
}

fn transaction_columns(scope: StatusScope) -> Vec<GridColumn<Transaction>> {
    let mut columns = vec![
        GridColumn::new("updateDate", "Data"),
        GridColumn::new("fiscalCode", "Codice fiscale"),
        GridColumn::new("additionalProperties", "Prodotto"),
        GridColumn::new("effectiveAmountCents", "Totale della spesa").with_render(effective_amount),
        GridColumn::new("rewardAmountCents", "Sconto applicato").with_render(reward_amount),
        GridColumn::new("status", "Stato"),
    ];
    if scope == StatusScope::Processed {
        columns.push(GridColumn::new("invoiceNumber", "Documento").unsortable());
    }
    columns
}

fn transaction_fields(scope: StatusScope) -> Vec<FilterField> {
    let status_options = scope
        .statuses()
        .iter()
        .map(|status| SelectOption::new(status.as_str(), status.label()))
        .collect();
    vec![
        FilterField::text("fiscalCode", "Codice fiscale"),
        FilterField::select("status", "Stato", status_options),
    ]
}

fn transaction_list(services: &AppServices, scope: StatusScope) -> ListOrchestrator<Transaction> {
    let (name, fetcher) = match scope {
        StatusScope::InProgress => ("in_progress", services.in_progress.clone()),
        StatusScope::Processed => ("processed", services.processed.clone()),
    };
    ListOrchestrator::new(
        name,
        fetcher,
        ListOptions {
            page_size: services.config.page_size,
            default_sort: Some(SortModel::desc("updateDate")),
            synonyms: SortSynonyms::transactions(),
        },
    )
}

fn messages(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, message)| (key.to_string(), message.to_string()))
        .collect()
}

#[component]
fn TransactionSummary(trx: Transaction) -> Element {
    let date = trx.update_date.format(DATE_TIME_FORMAT).to_string();
    let product = trx
        .product_name
        .clone()
        .unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());
    let amount = format_cents(trx.effective_amount_cents);
    let reward = format_cents(trx.reward_amount_cents);
    let status = trx.status.label();
    let fiscal_code = trx.fiscal_code.clone();
    let trx_code = trx.trx_code.clone();

    rsx! {
        div {
            style: "display: grid; grid-template-columns: 180px 1fr; gap: 6px 12px;",
            strong { "Data" } span { "{date}" }
            strong { "Codice transazione" } span { "{trx_code}" }
            strong { "Codice fiscale" } span { "{fiscal_code}" }
            strong { "Prodotto" } span { "{product}" }
            strong { "Totale della spesa" } span { "{amount}" }
            strong { "Sconto applicato" } span { "{reward}" }
            strong { "Stato" } span { "{status}" }
        }
    }
}

#[component]
pub fn InProgressTransactionsPage() -> Element {
    let services = use_context::<AppServices>();
    let list = use_hook(|| transaction_list(&services, StatusScope::InProgress));
    let mut refresh = use_signal(|| 0_u64);
    let mut selected = use_signal(|| None::<Transaction>);
    let mut busy = use_signal(|| false);

    let session = services.session.clone();
    let authorized = use_signal(move || session.take_flag(TRANSACTION_AUTHORIZED_FLAG));
    let mut captured = use_signal(|| false);
    let mut cancelled = use_signal(|| false);
    let mut capture_error = use_signal(|| false);
    let mut cancel_error = use_signal(|| false);
    use_auto_reset_banner(
        vec![authorized, captured, cancelled, capture_error, cancel_error],
        services.config.banner_delay,
    );

    let external_state = BTreeMap::from([
        (TRANSACTION_AUTHORIZED_FLAG.to_string(), authorized()),
        (TransactionAction::Capture.success_flag().to_string(), captured()),
        (TransactionAction::Cancel.success_flag().to_string(), cancelled()),
        (TransactionAction::Capture.error_flag().to_string(), capture_error()),
        (TransactionAction::Cancel.error_flag().to_string(), cancel_error()),
    ]);
    let alert_messages = messages(&[
        (TRANSACTION_AUTHORIZED_FLAG, "Pagamento autorizzato. Lo trovi nell'elenco qui sotto."),
        (TransactionAction::Capture.success_flag(), "Pagamento confermato."),
        (TransactionAction::Cancel.success_flag(), "Pagamento annullato."),
        (
            TransactionAction::Capture.error_flag(),
            "Non è stato possibile confermare il pagamento. Riprova.",
        ),
        (
            TransactionAction::Cancel.error_flag(),
            "Non è stato possibile annullare il pagamento. Riprova.",
        ),
    ]);

    let edit_for_capture = services.edit.clone();
    let edit_for_cancel = services.edit.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px;",
            h2 { "Pagamenti in corso" }
            TransactionsLayout {
                list,
                fields: transaction_fields(StatusScope::InProgress),
                columns: transaction_columns(StatusScope::InProgress),
                refresh: refresh(),
                external_state,
                alert_messages,
                banner_delay: services.config.banner_delay,
                empty_title: "Non ci sono pagamenti in corso.".to_string(),
                on_row_action: move |trx: Transaction| selected.set(Some(trx)),
            }
            if let Some(trx) = selected() {
                div {
                    style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: flex; flex-direction: column; gap: 12px;",
                    TransactionSummary { trx: trx.clone() }
                    div {
                        style: "display: flex; gap: 8px; justify-content: flex-end;",
                        button {
                            disabled: busy(),
                            onclick: move |_| selected.set(None),
                            "Chiudi"
                        }
                        if trx.can_cancel() {
                            button {
                                disabled: busy(),
                                style: "color: #b71c1c;",
                                onclick: {
                                    let uuid = trx.uuid.clone();
                                    let edit = edit_for_cancel.clone();
                                    move |_| {
                                        let uuid = uuid.clone();
                                        let edit = edit.clone();
                                        busy.set(true);
                                        spawn(async move {
                                            match edit.cancel(&uuid).await {
                                                Ok(_) => {
                                                    cancelled.set(true);
                                                    selected.set(None);
                                                    refresh += 1;
                                                }
                                                Err(_) => cancel_error.set(true),
                                            }
                                            busy.set(false);
                                        });
                                    }
                                },
                                "Annulla pagamento"
                            }
                        }
                        if trx.can_capture() {
                            button {
                                disabled: busy(),
                                style: "background: #1976d2; color: #fff; border: none; padding: 4px 14px; border-radius: 6px;",
                                onclick: {
                                    let uuid = trx.uuid.clone();
                                    let edit = edit_for_capture.clone();
                                    move |_| {
                                        let uuid = uuid.clone();
                                        let edit = edit.clone();
                                        busy.set(true);
                                        spawn(async move {
                                            match edit.capture(&uuid).await {
                                                Ok(_) => {
                                                    captured.set(true);
                                                    selected.set(None);
                                                    refresh += 1;
                                                }
                                                Err(_) => capture_error.set(true),
                                            }
                                            busy.set(false);
                                        });
                                    }
                                },
                                "Conferma pagamento"
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn InvoiceUploadPanel(trx: Transaction, on_uploaded: EventHandler<()>, on_close: EventHandler<()>) -> Element {
    let services = use_context::<AppServices>();
    let mut kind = use_signal(|| DocumentKind::Invoice);
    let mut document_number = use_signal(String::new);
    let mut file = use_signal(|| None::<PathBuf>);
    let mut errors = use_signal(InvoiceFormErrors::default);
    let mut upload_error = use_signal(|| false);
    let mut busy = use_signal(|| false);
    use_auto_reset_banner(vec![upload_error], services.config.banner_delay);

    let file_label = file()
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Nessun file selezionato".to_string());
    let field_errors = errors();
    let edit = services.edit.clone();
    let uuid = trx.uuid.clone();

    rsx! {
        div {
            style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: flex; flex-direction: column; gap: 12px;",
            TransactionSummary { trx: trx.clone() }
            if upload_error() {
                div {
                    style: "padding: 10px 14px; border-radius: 6px; background: #fdecea; border: 1px solid #e57373; color: #b71c1c;",
                    "Non è stato possibile caricare il documento. Riprova."
                }
            }
            div {
                style: "display: flex; gap: 16px;",
                {[DocumentKind::Invoice, DocumentKind::CreditNote].into_iter().map(|option| {
                    let label = option.label();
                    rsx!(
                        label {
                            key: "{label}",
                            style: "display: inline-flex; gap: 6px; align-items: center;",
                            input {
                                r#type: "radio",
                                name: "document-kind",
                                checked: kind() == option,
                                onchange: move |_| kind.set(option),
                            }
                            span { "{label}" }
                        }
                    )
                })}
            }
            label {
                style: "display: flex; flex-direction: column; gap: 4px;",
                span { "Numero documento" }
                input {
                    style: "border: 1px solid #bbb; border-radius: 6px; padding: 4px 8px;",
                    value: "{document_number}",
                    oninput: move |event| document_number.set(event.value()),
                }
                if field_errors.document_number {
                    span { style: "color: #b71c1c; font-size: 12px;", "Inserisci un numero documento valido (max 30 caratteri, lettere, numeri, / - _)." }
                }
            }
            div {
                style: "display: flex; align-items: center; gap: 8px;",
                button {
                    onclick: move |_| {
                        let picked = FileDialog::new()
                            .add_filter("Documento", &["pdf", "xml"])
                            .pick_file();
                        if picked.is_some() {
                            file.set(picked);
                        }
                    },
                    "Scegli file"
                }
                span { "{file_label}" }
            }
            if field_errors.file {
                span { style: "color: #b71c1c; font-size: 12px;", "Seleziona un file PDF o XML." }
            }
            div {
                style: "display: flex; gap: 8px; justify-content: flex-end;",
                button { disabled: busy(), onclick: move |_| on_close.call(()), "Chiudi" }
                button {
                    disabled: busy(),
                    style: "background: #1976d2; color: #fff; border: none; padding: 4px 14px; border-radius: 6px;",
                    onclick: move |_| {
                        let form = InvoiceForm {
                            kind: kind(),
                            document_number: document_number(),
                            file: file(),
                        };
                        let validation = form.validate();
                        errors.set(validation);
                        if validation.any() {
                            return;
                        }
                        let edit = edit.clone();
                        let uuid = uuid.clone();
                        busy.set(true);
                        spawn(async move {
                            match edit.upload_invoice(&uuid, &form).await {
                                Ok(_) => on_uploaded.call(()),
                                Err(_) => upload_error.set(true),
                            }
                            busy.set(false);
                        });
                    },
                    "Carica documento"
                }
            }
        }
    }
}

#[component]
pub fn ProcessedTransactionsPage() -> Element {
    let services = use_context::<AppServices>();
    let list = use_hook(|| transaction_list(&services, StatusScope::Processed));
    let mut refresh = use_signal(|| 0_u64);
    let mut selected = use_signal(|| None::<Transaction>);
    let mut uploaded = use_signal(|| false);
    use_auto_reset_banner(vec![uploaded], services.config.banner_delay);

    let external_state = BTreeMap::from([(
        TransactionAction::UploadInvoice.success_flag().to_string(),
        uploaded(),
    )]);
    let selected_key = selected().map(|trx| trx.uuid).unwrap_or_default();
    let alert_messages = messages(&[(
        TransactionAction::UploadInvoice.success_flag(),
        "Documento caricato correttamente.",
    )]);

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px;",
            h2 { "Pagamenti gestiti" }
            TransactionsLayout {
                list,
                fields: transaction_fields(StatusScope::Processed),
                columns: transaction_columns(StatusScope::Processed),
                refresh: refresh(),
                external_state,
                alert_messages,
                banner_delay: services.config.banner_delay,
                empty_title: "Non ci sono pagamenti gestiti.".to_string(),
                on_row_action: move |trx: Transaction| selected.set(Some(trx)),
            }
            if let Some(trx) = selected() {
                if trx.can_upload_invoice() {
                    InvoiceUploadPanel {
                        key: "{selected_key}",
                        trx: trx.clone(),
                        on_uploaded: move |_| {
                            uploaded.set(true);
                            selected.set(None);
                            refresh += 1;
                        },
                        on_close: move |_| selected.set(None),
                    }
                } else {
                    div {
                        style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: flex; flex-direction: column; gap: 12px;",
                        TransactionSummary { trx: trx.clone() }
                        div {
                            style: "text-align: right;",
                            button { onclick: move |_| selected.set(None), "Chiudi" }
                        }
                    }
                }
            }
        }
    }
}
