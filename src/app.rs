use dioxus::prelude::*;
use tracing::{info, warn};

use crate::config::PortalConfig;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::pages::accept_discount::AcceptDiscountPage;
use crate::ui::pages::products::ProductsPage;
use crate::ui::pages::profile::ProfilePage;
use crate::ui::pages::transactions::{InProgressTransactionsPage, ProcessedTransactionsPage};
use crate::ui::state::app_state::{AppServices, AppState, Route};
use crate::usecase::ports::session::SessionContext;

#[component]
pub fn App() -> Element {
    let config = use_context::<PortalConfig>();
    let services = use_context_provider(|| AppServices::new(config, SessionContext::new()));
    let AppState {
        mut route,
        mut status,
        mut busy,
    } = AppState::new();
    let mut profile_loaded = use_signal(|| false);

    let services_for_init = services.clone();
    use_effect(move || {
        let services = services_for_init.clone();
        services.session.set_token(services.config.session_token.clone());
        busy.set(true);
        spawn(async move {
            let repo = services.repo.clone();
            let pos_id = services.config.pos_id.clone();
            let lookup = pos_id.clone();
            match run_blocking(move || repo.point_of_sale(&lookup)).await {
                Ok(Ok(pos)) => {
                    info!(pos_id = %pos.id, business_name = %pos.business_name, "point of sale loaded");
                    status.set(pos.business_name.clone());
                    services.session.set_point_of_sale(pos);
                    services
                        .session
                        .set_initiative_id(services.config.initiative_id.clone());
                    profile_loaded.set(true);
                }
                Ok(Err(err)) => {
                    warn!(pos_id = %pos_id, error = %err, "failed to load point of sale");
                    status.set(format!("Punto vendita non disponibile: {err}"));
                }
                Err(err) => {
                    warn!(pos_id = %pos_id, error = %err, "point of sale lookup aborted");
                    status.set(format!("Punto vendita non disponibile: {err}"));
                }
            }
            busy.set(false);
        });
    });

    let current = route();

    rsx! {
        div {
            style: "font-family: 'Titillium Web', sans-serif; padding: 12px; background: #fff; min-height: 100vh; height: 100vh; overflow: auto;",

            div {
                style: "display: flex; gap: 16px; align-items: baseline; margin-bottom: 12px;",
                h2 { style: "margin: 0;", "Portale Esercenti" }
                if busy() {
                    span { style: "color: #777;", "Caricamento…" }
                } else {
                    span { style: "color: #555;", "{status}" }
                }
            }

            nav {
                style: "display: flex; gap: 4px; border-bottom: 1px solid #ddd; margin-bottom: 16px; position: sticky; top: 0; background: #fff; z-index: 900;",
                {Route::ALL.into_iter().map(|tab| {
                    let label = tab.label();
                    let active = tab == current;
                    let border = if active { "#1976d2" } else { "transparent" };
                    let weight = if active { "600" } else { "400" };
                    rsx!(
                        button {
                            key: "{label}",
                            style: "border: none; background: transparent; padding: 8px 14px; cursor: pointer; border-bottom: 3px solid {border}; font-weight: {weight};",
                            onclick: move |_| route.set(tab),
                            "{label}"
                        }
                    )
                })}
            }

            {match current {
                Route::Products => rsx! { ProductsPage {} },
                Route::AcceptDiscount => rsx! {
                    AcceptDiscountPage { on_authorized: move |_| route.set(Route::InProgress) }
                },
                Route::InProgress => rsx! { InProgressTransactionsPage {} },
                Route::Processed => rsx! { ProcessedTransactionsPage {} },
                Route::Profile => rsx! { ProfilePage { loaded: profile_loaded() } },
            }}
        }
    }
}
