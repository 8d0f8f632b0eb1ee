//! Fetch cycle behind every paginated list.
//!
//! The orchestrator owns the [`QueryState`], decides whether a trigger turns
//! into a request and folds the outcome back into rows and flags. Only one
//! request may be in flight: triggers that arrive meanwhile are dropped, not
//! queued, and leave the query untouched.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::domain::entities::query::{
    Filters, ListParams, PaginationModel, QueryState, SortModel, SortSynonyms, DEFAULT_PAGE_SIZE,
};
use crate::usecase::ports::fetcher::{FetchError, ListFetcher, PageResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListTrigger {
    Mount,
    Refresh,
    ApplyFilters(Filters),
    /// Carries the cleared form values so the request names every field.
    ResetFilters(Filters),
    Paginate(PaginationModel),
    Sort(Option<SortModel>),
}

impl ListTrigger {
    fn name(&self) -> &'static str {
        match self {
            ListTrigger::Mount => "mount",
            ListTrigger::Refresh => "refresh",
            ListTrigger::ApplyFilters(_) => "apply_filters",
            ListTrigger::ResetFilters(_) => "reset_filters",
            ListTrigger::Paginate(_) => "paginate",
            ListTrigger::Sort(_) => "sort",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Loaded,
    Failed,
    /// Another request was in flight.
    Dropped,
    /// The trigger did not change anything worth a request.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NeverSearched,
    NoResults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub page_size: u32,
    pub default_sort: Option<SortModel>,
    pub synonyms: SortSynonyms,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_sort: None,
            synonyms: SortSynonyms::none(),
        }
    }
}

/// Everything the view needs, copied out of the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<R> {
    pub phase: ListPhase,
    pub rows: Vec<R>,
    pub pagination: PaginationModel,
    pub total_elements: u64,
    pub sort: Option<SortModel>,
    pub filters: Filters,
    pub error: bool,
    pub filters_applied_once: bool,
}

impl<R> ListSnapshot<R> {
    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.rows.is_empty() || matches!(self.phase, ListPhase::Idle | ListPhase::Loading) {
            return None;
        }
        if self.filters_applied_once {
            Some(EmptyState::NoResults)
        } else {
            Some(EmptyState::NeverSearched)
        }
    }

    /// Filters stay hidden over an empty list nobody has searched yet.
    pub fn show_filter_form(&self, form_has_values: bool) -> bool {
        !self.rows.is_empty() || self.filters_applied_once || form_has_values
    }
}

/// Ticket for a request that passed the in-flight guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub params: ListParams,
}

struct ListState<R> {
    query: QueryState,
    phase: ListPhase,
    rows: Vec<R>,
    pagination: PaginationModel,
    total_elements: u64,
    error: bool,
    filters_applied_once: bool,
    options: ListOptions,
}

impl<R: Clone> ListState<R> {
    fn new(options: ListOptions) -> Self {
        let query = QueryState::new(options.page_size);
        Self {
            pagination: query.pagination(),
            query,
            phase: ListPhase::Idle,
            rows: Vec::new(),
            total_elements: 0,
            error: false,
            filters_applied_once: false,
            options,
        }
    }

    fn begin(&mut self, trigger: ListTrigger) -> Result<PendingFetch, DispatchOutcome> {
        if self.phase == ListPhase::Loading {
            return Err(DispatchOutcome::Dropped);
        }

        match trigger {
            ListTrigger::Mount => {
                if let Some(sort) = self.options.default_sort.clone() {
                    self.query.sort = Some(sort);
                }
            }
            ListTrigger::Refresh => {}
            ListTrigger::ApplyFilters(filters) => {
                self.query.filters = filters;
                self.query.page = 0;
                self.filters_applied_once = true;
            }
            ListTrigger::ResetFilters(cleared) => {
                if !self.filters_applied_once {
                    return Err(DispatchOutcome::Skipped);
                }
                self.query.filters = cleared;
                self.query.page = 0;
                self.filters_applied_once = false;
            }
            ListTrigger::Paginate(model) => {
                if model == self.query.pagination() {
                    return Err(DispatchOutcome::Skipped);
                }
                self.query.page = model.page;
                self.query.page_size = model.page_size.max(1);
            }
            ListTrigger::Sort(None) => return Err(DispatchOutcome::Skipped),
            ListTrigger::Sort(Some(sort)) => {
                self.query.sort = Some(sort);
            }
        }

        self.phase = ListPhase::Loading;
        Ok(PendingFetch {
            params: self.query.to_params(&self.options.synonyms),
        })
    }

    fn complete(
        &mut self,
        params: &ListParams,
        outcome: Result<PageResponse<R>, FetchError>,
    ) -> DispatchOutcome {
        match outcome {
            Ok(response) => {
                let page = response.page_no.unwrap_or(params.page);
                let page_size = response.page_size.unwrap_or(params.size).max(1);
                self.total_elements = response
                    .total_elements
                    .unwrap_or(response.content.len() as u64);
                self.rows = response.content;
                self.pagination = PaginationModel::new(page, page_size);
                self.query.page = page;
                self.query.page_size = page_size;
                self.error = false;
                self.phase = ListPhase::Loaded;
                DispatchOutcome::Loaded
            }
            Err(_) => {
                self.error = true;
                self.phase = ListPhase::Failed;
                DispatchOutcome::Failed
            }
        }
    }

    fn snapshot(&self) -> ListSnapshot<R> {
        ListSnapshot {
            phase: self.phase,
            rows: self.rows.clone(),
            pagination: self.pagination,
            total_elements: self.total_elements,
            sort: self.query.sort.clone(),
            filters: self.query.filters.clone(),
            error: self.error,
            filters_applied_once: self.filters_applied_once,
        }
    }
}

pub struct ListOrchestrator<R: Send + 'static> {
    name: &'static str,
    state: Arc<Mutex<ListState<R>>>,
    fetcher: Arc<dyn ListFetcher<R>>,
}

impl<R: Send + 'static> Clone for ListOrchestrator<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state: self.state.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<R: Send + 'static> PartialEq for ListOrchestrator<R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<R: Clone + Send + 'static> ListOrchestrator<R> {
    pub fn new(name: &'static str, fetcher: Arc<dyn ListFetcher<R>>, options: ListOptions) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(ListState::new(options))),
            fetcher,
        }
    }

    /// Runs the in-flight guard and moves to `Loading` when the trigger is accepted.
    pub fn begin(&self, trigger: ListTrigger) -> Result<PendingFetch, DispatchOutcome> {
        let trigger_name = trigger.name();
        let result = self.state.lock().begin(trigger);
        match &result {
            Ok(pending) => debug!(
                list = self.name,
                trigger = trigger_name,
                page = pending.params.page,
                size = pending.params.size,
                sort = pending.params.sort.as_deref().unwrap_or(""),
                "list fetch started"
            ),
            Err(outcome) => debug!(
                list = self.name,
                trigger = trigger_name,
                ?outcome,
                "list trigger ignored"
            ),
        }
        result
    }

    /// Issues the request for an accepted trigger and folds the outcome in.
    pub async fn finish(&self, pending: PendingFetch) -> DispatchOutcome {
        let outcome = self.fetcher.fetch(pending.params.clone()).await;
        if let Err(err) = &outcome {
            error!(
                list = self.name,
                page = pending.params.page,
                size = pending.params.size,
                error = %err,
                "list fetch failed"
            );
        }
        let result = self.state.lock().complete(&pending.params, outcome);
        if result == DispatchOutcome::Loaded {
            let snapshot = self.snapshot();
            info!(
                list = self.name,
                rows = snapshot.rows.len(),
                total = snapshot.total_elements,
                "list fetch completed"
            );
        }
        result
    }

    pub async fn dispatch(&self, trigger: ListTrigger) -> DispatchOutcome {
        match self.begin(trigger) {
            Ok(pending) => self.finish(pending).await,
            Err(outcome) => outcome,
        }
    }

    pub fn snapshot(&self) -> ListSnapshot<R> {
        self.state.lock().snapshot()
    }
}
