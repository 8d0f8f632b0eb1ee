use dioxus::prelude::*;

use crate::ui::state::filter_form::{FilterField, FilterForm, FilterKind, SelectOption};

const ALL_OPTION_LABEL: &str = "Tutti";

fn dropdown_label(options: &[SelectOption], selected: &str) -> String {
    options
        .iter()
        .find(|opt| opt.value == selected)
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| ALL_OPTION_LABEL.to_string())
}

#[component]
fn DropdownSelect(
    id: String,
    label: String,
    options: Vec<SelectOption>,
    selected: String,
    mut open_dropdown: Signal<Option<String>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open_dropdown().as_deref() == Some(id.as_str());
    let selected_label = dropdown_label(&options, &selected);
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));
    let id_for_toggle = id.clone();

    let mut entries = vec![SelectOption::new("", ALL_OPTION_LABEL)];
    entries.extend(options.iter().cloned());

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            span { "{label}" }
            button {
                r#type: "button",
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer; min-width: 140px; text-align: left;",
                onclick: move |event| {
                    event.stop_propagation();
                    if open_dropdown().as_deref() == Some(id_for_toggle.as_str()) {
                        open_dropdown.set(None);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open_dropdown.set(Some(id_for_toggle.clone()));
                },
                "{selected_label}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 200px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {entries.iter().map(|opt| {
                    let value = opt.value.clone();
                    let label = opt.label.clone();
                    let background = if selected == value { "#eef4ff" } else { "transparent" };
                    rsx!(
                        div {
                            key: "{value}",
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                on_select.call(value.clone());
                                open_dropdown.set(None);
                            },
                            "{label}"
                        }
                    )
                })}
            }
        }
    }
}

#[component]
fn TextFilter(name: String, label: String, placeholder: String, mut form: Signal<FilterForm>) -> Element {
    let value = form.read().value(&name).to_string();
    let border = if form.read().is_touched(&name) && !value.is_empty() {
        "#1976d2"
    } else {
        "#bbb"
    };
    let name_for_input = name.clone();
    let name_for_blur = name.clone();

    rsx! {
        label {
            style: "display: inline-flex; align-items: center; gap: 6px;",
            span { "{label}" }
            input {
                style: "border: 1px solid {border}; border-radius: 6px; padding: 4px 8px;",
                value: "{value}",
                placeholder: "{placeholder}",
                oninput: move |event| form.write().handle_change(&name_for_input, event.value()),
                onblur: move |_| form.write().handle_blur(&name_for_blur),
            }
        }
    }
}

/// Filter bar. Each field gets the form binding explicitly.
#[component]
pub fn FilterFormView(
    fields: Vec<FilterField>,
    mut form: Signal<FilterForm>,
    on_apply: EventHandler<()>,
    on_reset: EventHandler<()>,
) -> Element {
    let open_dropdown = use_signal(|| None::<String>);
    let dropdown_pos = use_signal(|| None::<(f64, f64)>);
    let submitting = form.read().is_submitting();
    let has_values = form.read().has_values();

    rsx! {
        form {
            style: "display: flex; flex-wrap: wrap; align-items: center; gap: 12px; padding: 8px 0;",
            onsubmit: move |event| {
                event.prevent_default();
                on_apply.call(());
            },
            {fields.iter().map(|field| {
                let name = field.name.clone();
                let label = field.label.clone();
                match &field.kind {
                    FilterKind::Text { placeholder } => rsx!(
                        TextFilter {
                            key: "{name}",
                            name: name.clone(),
                            label,
                            placeholder: placeholder.clone(),
                            form,
                        }
                    ),
                    FilterKind::Select { options } => {
                        let selected = form.read().value(&name).to_string();
                        let name_for_select = name.clone();
                        rsx!(
                            DropdownSelect {
                                key: "{name}",
                                id: name.clone(),
                                label,
                                options: options.clone(),
                                selected,
                                open_dropdown,
                                dropdown_pos,
                                on_select: move |value: String| {
                                    form.write().handle_change(&name_for_select, value);
                                },
                            }
                        )
                    }
                }
            })}
            button {
                r#type: "submit",
                disabled: submitting || !has_values,
                style: "border: 1px solid #1565c0; background: #1976d2; color: #fff; padding: 4px 14px; border-radius: 6px; cursor: pointer;",
                "Filtra"
            }
            button {
                r#type: "button",
                disabled: submitting,
                style: "border: none; background: transparent; color: #1976d2; cursor: pointer;",
                onclick: move |_| on_reset.call(()),
                "Rimuovi filtri"
            }
        }
    }
}
