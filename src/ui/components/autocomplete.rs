use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use dioxus::core::Task;
use dioxus::prelude::*;

use crate::ui::state::search_box::{
    InputOutcome, SearchBox, SearchOption, SearchResults, SearchSettings,
};

#[derive(Clone)]
struct SearchHandles {
    search: Rc<RefCell<SearchBox>>,
    debounce_task: Rc<Cell<Option<Task>>>,
    version: Signal<u64>,
    on_change_debounce: EventHandler<String>,
    on_change: EventHandler<Option<SearchOption>>,
}

impl SearchHandles {
    fn rerender(&self) {
        let mut version = self.version;
        version += 1;
    }

    /// Reports a cleared selection and (re)arms the debounce timer.
    fn apply(&self, outcome: InputOutcome) {
        if outcome.clear_selection {
            self.on_change.call(None);
        }
        if let Some(deadline) = outcome.deadline {
            if let Some(previous) = self.debounce_task.take() {
                previous.cancel();
            }
            let handles = self.clone();
            self.debounce_task.set(Some(spawn(async move {
                tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                let dispatched = handles.search.borrow_mut().poll(Instant::now());
                if let Some(text) = dispatched {
                    handles.on_change_debounce.call(text);
                }
                handles.rerender();
            })));
        }
        self.rerender();
    }
}

/// Remote-search autocomplete. The caller fetches `results` when
/// `on_change_debounce` fires; each supplied answer ends the loading state.
#[component]
pub fn Autocomplete(
    results: SearchResults,
    settings: SearchSettings,
    placeholder: String,
    on_change_debounce: EventHandler<String>,
    on_change: EventHandler<Option<SearchOption>>,
) -> Element {
    let search = use_hook(|| Rc::new(RefCell::new(SearchBox::new(settings))));
    let debounce_task = use_hook(|| Rc::new(Cell::new(None::<Task>)));
    let version = use_signal(|| 0_u64);
    let mut paste_pending = use_signal(|| false);
    let handles = SearchHandles {
        search: search.clone(),
        debounce_task,
        version,
        on_change_debounce,
        on_change,
    };

    let handles_for_options = handles.clone();
    use_effect(use_reactive((&results,), move |(results,)| {
        if handles_for_options.search.borrow_mut().receive_results(&results) {
            handles_for_options.rerender();
        }
    }));

    let _ = version();
    let (input, loading, visible) = {
        let state = search.borrow();
        (
            state.input().to_string(),
            state.is_loading(),
            state.visible_options().to_vec(),
        )
    };

    let handles_for_input = handles.clone();
    let handles_for_blur = handles.clone();

    rsx! {
        div {
            style: "position: relative; display: inline-flex; flex-direction: column; min-width: 320px;",
            div {
                style: "display: flex; align-items: center; gap: 6px;",
                input {
                    style: "flex: 1; border: 1px solid #bbb; border-radius: 6px; padding: 6px 10px;",
                    value: "{input}",
                    placeholder: "{placeholder}",
                    onpaste: move |_| paste_pending.set(true),
                    oninput: move |event| {
                        let now = Instant::now();
                        let outcome = if paste_pending() {
                            paste_pending.set(false);
                            handles_for_input.search.borrow_mut().on_paste(&event.value(), now)
                        } else {
                            handles_for_input.search.borrow_mut().on_input(&event.value(), now)
                        };
                        handles_for_input.apply(outcome);
                    },
                    onblur: move |_| {
                        let outcome = handles_for_blur.search.borrow_mut().on_blur(Instant::now());
                        handles_for_blur.apply(outcome);
                    },
                }
                if loading {
                    span { style: "color: #777; font-size: 12px;", "Ricerca…" }
                }
            }
            if !visible.is_empty() {
                div {
                    style: "position: absolute; top: 100%; left: 0; right: 0; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1100; max-height: 280px; overflow-y: auto;",
                    {visible.into_iter().map(|option| {
                        let handles = handles.clone();
                        let key = option.value.clone();
                        let label = option.label.clone();
                        rsx!(
                            div {
                                key: "{key}",
                                style: "padding: 8px 10px; cursor: pointer;",
                                onmousedown: move |event| {
                                    event.prevent_default();
                                    let picked = handles.search.borrow_mut().select(option.clone());
                                    handles.on_change.call(Some(picked));
                                    handles.rerender();
                                },
                                "{label}"
                            }
                        )
                    })}
                }
            }
        }
    }
}
