use std::collections::BTreeMap;

use dioxus::prelude::*;

use crate::domain::entities::discount::{DiscountPreview, DISCOUNT_CODE_LEN};
use crate::domain::entities::page::MISSING_DATA_PLACEHOLDER;
use crate::domain::entities::transaction::format_cents;
use crate::ui::components::alerts::Alerts;
use crate::ui::hooks::use_auto_reset_banner;
use crate::ui::state::app_state::AppServices;
use crate::ui::state::banner::active_alerts;
use crate::usecase::services::discount_service::PreviewError;
use crate::usecase::services::edit_service::TransactionAction;

const PREVIEW_ERROR_KEY: &str = "errorPreviewDiscount";

fn field_message(err: &PreviewError) -> &'static str {
    match err {
        PreviewError::InvalidFormat => "Il codice deve essere di 8 caratteri alfanumerici.",
        PreviewError::CodeNotFound => "Codice sconto non valido o scaduto.",
        PreviewError::AlreadyAuthorized => "Codice sconto già utilizzato.",
        PreviewError::Backend(_) => "",
    }
}

/// Preview-then-authorize flow for a discount code. The draft is restored
/// from the session when the page is reopened.
#[component]
pub fn AcceptDiscountPage(on_authorized: EventHandler<()>) -> Element {
    let services = use_context::<AppServices>();
    let draft = use_hook(|| services.discounts.draft().unwrap_or_default());
    let draft_code = draft.code.clone();
    let draft_preview = draft.preview.clone();
    let mut code = use_signal(move || draft_code);
    let mut preview = use_signal(move || draft_preview);
    let mut field_error = use_signal(|| None::<&'static str>);
    let mut busy = use_signal(|| false);
    let mut preview_error = use_signal(|| false);
    let mut authorize_error = use_signal(|| false);
    use_auto_reset_banner(
        vec![preview_error, authorize_error],
        services.config.banner_delay,
    );

    let alerts = active_alerts(
        &BTreeMap::from([
            (PREVIEW_ERROR_KEY.to_string(), preview_error()),
            (
                TransactionAction::AuthorizeDiscount.error_flag().to_string(),
                authorize_error(),
            ),
        ]),
        &BTreeMap::from([
            (
                PREVIEW_ERROR_KEY.to_string(),
                "Non è stato possibile verificare il codice. Riprova.".to_string(),
            ),
            (
                TransactionAction::AuthorizeDiscount.error_flag().to_string(),
                "Non è stato possibile autorizzare il pagamento. Riprova.".to_string(),
            ),
        ]),
    );

    let max_input_len = DISCOUNT_CODE_LEN + 2;
    let discounts_for_preview = services.discounts.clone();
    let discounts_for_authorize = services.discounts.clone();
    let discounts_for_discard = services.discounts.clone();

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px; max-width: 560px;",
            h2 { "Accetta buono sconto" }
            Alerts { alerts }
            {match preview() {
                None => rsx! {
                    form {
                        style: "display: flex; flex-direction: column; gap: 8px;",
                        onsubmit: move |event| {
                            event.prevent_default();
                            let raw = code();
                            let discounts = discounts_for_preview.clone();
                            busy.set(true);
                            field_error.set(None);
                            spawn(async move {
                                match discounts.preview(&raw).await {
                                    Ok(found) => preview.set(Some(found)),
                                    Err(err) if err.is_field_error() => {
                                        field_error.set(Some(field_message(&err)));
                                    }
                                    Err(_) => preview_error.set(true),
                                }
                                busy.set(false);
                            });
                        },
                        label {
                            style: "display: flex; flex-direction: column; gap: 4px;",
                            span { "Codice sconto" }
                            input {
                                style: "border: 1px solid #bbb; border-radius: 6px; padding: 6px 10px; text-transform: uppercase;",
                                maxlength: "{max_input_len}",
                                value: "{code}",
                                oninput: move |event| {
                                    code.set(event.value());
                                    field_error.set(None);
                                },
                            }
                            if let Some(message) = field_error() {
                                span { style: "color: #b71c1c; font-size: 12px;", "{message}" }
                            }
                        }
                        div {
                            button {
                                r#type: "submit",
                                disabled: busy() || code().trim().is_empty(),
                                style: "background: #1976d2; color: #fff; border: none; padding: 6px 16px; border-radius: 6px;",
                                "Continua"
                            }
                        }
                    }
                },
                Some(found) => rsx! {
                    DiscountSummary { preview: found }
                    div {
                        style: "display: flex; gap: 8px; justify-content: flex-end;",
                        button {
                            disabled: busy(),
                            onclick: move |_| {
                                discounts_for_discard.discard();
                                preview.set(None);
                                code.set(String::new());
                            },
                            "Annulla"
                        }
                        button {
                            disabled: busy(),
                            style: "background: #1976d2; color: #fff; border: none; padding: 6px 16px; border-radius: 6px;",
                            onclick: move |_| {
                                let discounts = discounts_for_authorize.clone();
                                busy.set(true);
                                spawn(async move {
                                    match discounts.authorize().await {
                                        Ok(_) => {
                                            preview.set(None);
                                            code.set(String::new());
                                            on_authorized.call(());
                                        }
                                        Err(_) => authorize_error.set(true),
                                    }
                                    busy.set(false);
                                });
                            },
                            "Autorizza pagamento"
                        }
                    }
                },
            }}
        }
    }
}

#[component]
fn DiscountSummary(preview: DiscountPreview) -> Element {
    let code = preview.code.clone();
    let fiscal_code = preview.fiscal_code.clone();
    let product = preview
        .product_name
        .clone()
        .unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());
    let amount = format_cents(preview.amount_cents);
    let reward = format_cents(preview.reward_cents);
    let residual = format_cents(preview.residual_cents());
    let expires_at = preview.expires_at.clone();

    rsx! {
        div {
            style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: grid; grid-template-columns: 200px 1fr; gap: 6px 12px;",
            strong { "Codice sconto" } span { "{code}" }
            strong { "Codice fiscale" } span { "{fiscal_code}" }
            strong { "Prodotto" } span { "{product}" }
            strong { "Totale della spesa" } span { "{amount}" }
            strong { "Sconto applicato" } span { "{reward}" }
            strong { "Importo da pagare" } span { "{residual}" }
            strong { "Valido fino al" } span { "{expires_at}" }
        }
    }
}
