use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use tracing::debug;

use crate::domain::entities::page::TableRow;
use crate::domain::entities::query::{PaginationModel, SortDirection, SortModel, PAGE_SIZE_OPTIONS};
use crate::ui::state::grid::{
    GridColumn, GridState, GridView, PageChange, PaginationDecision, DEFAULT_UNIQUE_FIELD,
};

fn default_unique_field() -> String {
    DEFAULT_UNIQUE_FIELD.to_string()
}

fn request_page(
    grid: &Rc<RefCell<GridState>>,
    requested: PaginationModel,
    generation: u64,
    loading: bool,
    on_pagination_change: EventHandler<PageChange>,
) {
    let decision = grid
        .borrow_mut()
        .on_pagination_change(requested, generation, loading);
    match decision {
        PaginationDecision::Forward(change) => on_pagination_change.call(change),
        PaginationDecision::Ignored(reason) => {
            debug!(?reason, page = requested.page, size = requested.page_size, "pagination change ignored")
        }
    }
}

fn sort_indicator(direction: Option<SortDirection>) -> &'static str {
    match direction {
        Some(SortDirection::Asc) => " ▲",
        Some(SortDirection::Desc) => " ▼",
        None => "",
    }
}

#[component]
pub fn DataTable<R: TableRow + Clone + PartialEq + 'static>(
    rows: Vec<R>,
    columns: Vec<GridColumn<R>>,
    pagination: PaginationModel,
    total_elements: u64,
    sort: Option<SortModel>,
    loading: bool,
    #[props(default = default_unique_field())] unique_field: String,
    on_pagination_change: EventHandler<PageChange>,
    on_sort_change: EventHandler<SortModel>,
    on_row_action: EventHandler<R>,
) -> Element {
    let grid = use_hook(|| Rc::new(RefCell::new(GridState::new(pagination))));
    let generation = {
        let mut state = grid.borrow_mut();
        state.sync_sort(sort.clone());
        state.push_external(pagination)
    };

    let view = {
        let state = grid.borrow();
        GridView::build(&rows, &columns, &unique_field, state.sort())
    };
    let Some(view) = view else {
        return rsx! {};
    };

    let (model, page_count, previous, next) = {
        let state = grid.borrow();
        (
            state.model(),
            state.page_count(total_elements).max(1),
            state.previous_page(),
            state.next_page(total_elements),
        )
    };
    let current_page = model.page + 1;
    let page_size = model.page_size;
    let opacity = if loading { "0.55" } else { "1" };

    let grid_for_prev = grid.clone();
    let grid_for_next = grid.clone();
    let grid_for_size = grid.clone();

    rsx! {
        div {
            style: "border: 1px solid #ddd; border-radius: 8px; overflow: auto; opacity: {opacity};",
            table {
                style: "border-collapse: collapse; width: 100%; font-size: 14px;",
                thead {
                    tr {
                        {view.headers.iter().map(|header| {
                            let field = header.field.clone();
                            let sortable = header.sortable;
                            let grid = grid.clone();
                            let cursor = if sortable { "pointer" } else { "default" };
                            let indicator = sort_indicator(header.sort);
                            let label = header.label.clone();
                            rsx!(
                                th {
                                    key: "{field}",
                                    style: "position: sticky; top: 0; background: #f5f7fa; text-align: left; padding: 8px 10px; border-bottom: 1px solid #ddd; cursor: {cursor}; white-space: nowrap;",
                                    onclick: move |_| {
                                        if !sortable {
                                            return;
                                        }
                                        let next_sort = grid.borrow_mut().header_click(&field);
                                        if let Some(model) = next_sort {
                                            on_sort_change.call(model);
                                        }
                                    },
                                    "{label}{indicator}"
                                }
                            )
                        })}
                    }
                }
                tbody {
                    {view.rows.iter().map(|row| {
                        let record = rows[row.index].clone();
                        let row_key = row.key.clone();
                        rsx!(
                            tr {
                                key: "{row_key}",
                                style: "border-bottom: 1px solid #eee;",
                                {row.cells.iter().map(|cell| rsx!(
                                    td {
                                        style: "padding: 6px 10px; white-space: nowrap;",
                                        "{cell}"
                                    }
                                ))}
                                td {
                                    style: "padding: 4px 10px; text-align: right;",
                                    button {
                                        style: "border: none; background: transparent; font-size: 18px; cursor: pointer;",
                                        title: "Dettaglio",
                                        onclick: move |_| on_row_action.call(record.clone()),
                                        "›"
                                    }
                                }
                            }
                        )
                    })}
                }
            }
            div {
                style: "display: flex; align-items: center; justify-content: flex-end; gap: 12px; padding: 8px 10px; border-top: 1px solid #ddd;",
                span { "Righe per pagina" }
                select {
                    value: "{page_size}",
                    disabled: loading,
                    onchange: move |event| {
                        let Ok(size) = event.value().parse::<u32>() else {
                            return;
                        };
                        let requested = grid_for_size.borrow().with_page_size(size);
                        request_page(&grid_for_size, requested, generation, loading, on_pagination_change);
                    },
                    {PAGE_SIZE_OPTIONS.iter().map(|size| rsx!(
                        option { key: "{size}", value: "{size}", selected: *size == page_size, "{size}" }
                    ))}
                }
                span { "Pagina {current_page} di {page_count} ({total_elements} elementi)" }
                button {
                    disabled: loading || previous.is_none(),
                    onclick: move |_| {
                        if let Some(requested) = previous {
                            request_page(&grid_for_prev, requested, generation, loading, on_pagination_change);
                        }
                    },
                    "‹"
                }
                button {
                    disabled: loading || next.is_none(),
                    onclick: move |_| {
                        if let Some(requested) = next {
                            request_page(&grid_for_next, requested, generation, loading, on_pagination_change);
                        }
                    },
                    "›"
                }
            }
        }
    }
}
