use dioxus::prelude::*;

use crate::domain::entities::page::MISSING_DATA_PLACEHOLDER;
use crate::ui::state::app_state::AppServices;

/// `loaded` flips once the point of sale has been read into the session.
#[component]
pub fn ProfilePage(loaded: bool) -> Element {
    let services = use_context::<AppServices>();
    let initiative = services
        .session
        .initiative_id()
        .unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());

    let signed_in = if services.session.token().is_some() {
        "Sessione autenticata"
    } else {
        "Sessione locale"
    };
    let pos = if loaded { services.session.point_of_sale() } else { None };
    let Some(pos) = pos else {
        return rsx! {
            div {
                h2 { "Dati punto vendita" }
                p { style: "color: #777;", "Dati del punto vendita non disponibili." }
            }
        };
    };
    let website = pos
        .website
        .clone()
        .unwrap_or_else(|| MISSING_DATA_PLACEHOLDER.to_string());
    let rows = [
        ("Ragione sociale", pos.business_name.clone()),
        ("Partita IVA", pos.vat_number.clone()),
        ("Indirizzo", pos.address.clone()),
        ("Città", pos.city.clone()),
        ("Email", pos.contact_email.clone()),
        ("Sito web", website),
        ("Iniziativa", initiative),
        ("Accesso", signed_in.to_string()),
    ];

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px; max-width: 640px;",
            h2 { "Dati punto vendita" }
            div {
                style: "border: 1px solid #ddd; border-radius: 8px; padding: 16px; display: grid; grid-template-columns: 200px 1fr; gap: 6px 12px;",
                {rows.into_iter().map(|(label, value)| rsx!(
                    div {
                        key: "{label}",
                        style: "display: contents;",
                        strong { "{label}" }
                        span { "{value}" }
                    }
                ))}
            }
        }
    }
}
