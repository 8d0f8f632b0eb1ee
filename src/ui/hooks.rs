use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use dioxus::core::Task;
use dioxus::prelude::*;
use tracing::debug;

use crate::ui::state::banner::BannerTimer;
use crate::usecase::ports::fetcher::ListFetcher;
use crate::usecase::services::list_orchestrator::{
    DispatchOutcome, ListOptions, ListOrchestrator, ListSnapshot, ListTrigger,
};

/// Lowers every raised flag `delay` after the flag vector last changed.
pub fn use_auto_reset_banner(flags: Vec<Signal<bool>>, delay: Duration) {
    let timer = use_hook(|| Rc::new(RefCell::new(BannerTimer::default())));
    let task = use_hook(|| Rc::new(Cell::new(None::<Task>)));

    let timer_for_effect = timer.clone();
    let task_for_effect = task.clone();
    use_effect(use_reactive((&delay,), move |(delay,)| {
        let values: Vec<bool> = flags.iter().map(|flag| flag()).collect();
        if !timer_for_effect
            .borrow_mut()
            .sync(&values, delay, Instant::now())
        {
            return;
        }
        if let Some(previous) = task_for_effect.take() {
            previous.cancel();
        }
        if values.iter().all(|value| !value) {
            return;
        }

        let timer = timer_for_effect.clone();
        let flags = flags.clone();
        task_for_effect.set(Some(spawn(async move {
            loop {
                let Some(deadline) = timer.borrow().next_deadline() else {
                    break;
                };
                tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

                let mut setters: Vec<Box<dyn FnMut(bool)>> = flags
                    .iter()
                    .map(|flag| {
                        let mut flag = *flag;
                        Box::new(move |value: bool| flag.set(value)) as Box<dyn FnMut(bool)>
                    })
                    .collect();
                let mut setters: Vec<&mut dyn FnMut(bool)> = setters
                    .iter_mut()
                    .map(|setter| setter.as_mut() as &mut dyn FnMut(bool))
                    .collect();
                let fired = timer.borrow_mut().fire_due(Instant::now(), &mut setters);
                debug!(fired, "banner flags reset");
            }
        })));
    }));

    use_drop(move || {
        timer.borrow_mut().unmount();
        if let Some(pending) = task.take() {
            pending.cancel();
        }
    });
}

/// One orchestrator per component instance plus the snapshot the view renders.
pub fn use_list<R: Clone + Send + 'static>(
    name: &'static str,
    fetcher: impl FnOnce() -> std::sync::Arc<dyn ListFetcher<R>>,
    options: impl FnOnce() -> ListOptions,
) -> (ListOrchestrator<R>, Signal<ListSnapshot<R>>) {
    let list = use_hook(|| ListOrchestrator::new(name, fetcher(), options()));
    let list_for_snapshot = list.clone();
    let snapshot = use_signal(move || list_for_snapshot.snapshot());
    (list, snapshot)
}

/// Runs one trigger, publishing the loading state before the request and
/// the outcome after it.
pub async fn run_list_trigger<R: Clone + Send + 'static>(
    list: ListOrchestrator<R>,
    trigger: ListTrigger,
    mut snapshot: Signal<ListSnapshot<R>>,
    mut fetch_error: Signal<bool>,
) -> DispatchOutcome {
    let pending = match list.begin(trigger) {
        Ok(pending) => pending,
        Err(outcome) => return outcome,
    };
    snapshot.set(list.snapshot());

    let outcome = list.finish(pending).await;
    let latest = list.snapshot();
    fetch_error.set(latest.error);
    snapshot.set(latest);
    outcome
}
