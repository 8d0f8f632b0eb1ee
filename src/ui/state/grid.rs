//! Pagination and sort reconciliation for the data table.
//!
//! The table keeps its own pagination model so the controls respond at once,
//! while the list pushes the server's model after every fetch. Each push gets
//! a generation number; widget events carry the generation they were rendered
//! with, so events from before a push are dropped without any timing window.
//! A push also becomes the current model, so its echo is an unchanged model.

use std::collections::BTreeSet;

use tracing::warn;

use crate::domain::entities::page::{TableRow, MISSING_DATA_PLACEHOLDER};
use crate::domain::entities::query::{PaginationModel, SortDirection, SortModel};

pub const DEFAULT_UNIQUE_FIELD: &str = "id";

pub struct GridColumn<R> {
    pub field: String,
    pub header: String,
    pub sortable: bool,
    pub render: Option<fn(&R) -> String>,
}

impl<R> Clone for GridColumn<R> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            render: self.render,
        }
    }
}

// Renderers are plain functions; columns are equal when they describe the same field.
impl<R> PartialEq for GridColumn<R> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.header == other.header
            && self.sortable == other.sortable
            && self.render.is_some() == other.render.is_some()
    }
}

impl<R> std::fmt::Debug for GridColumn<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridColumn")
            .field("field", &self.field)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

impl<R: TableRow> GridColumn<R> {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            sortable: true,
            render: None,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn with_render(mut self, render: fn(&R) -> String) -> Self {
        self.render = Some(render);
        self
    }

    pub fn render_cell(&self, row: &R) -> String {
        match self.render {
            Some(render) => render(row),
            None => row.cell(&self.field).display_or(MISSING_DATA_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridHeader {
    pub field: String,
    pub label: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRowView {
    pub key: String,
    /// Index into the rows handed to [`GridView::build`].
    pub index: usize,
    pub cells: Vec<String>,
}

/// Rendered form of one page. The last header is the unlabelled actions column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub headers: Vec<GridHeader>,
    pub rows: Vec<GridRowView>,
}

impl GridView {
    /// `None` unless there are both rows and columns.
    pub fn build<R: TableRow>(
        rows: &[R],
        columns: &[GridColumn<R>],
        unique_field: &str,
        sort: Option<&SortModel>,
    ) -> Option<Self> {
        if rows.is_empty() || columns.is_empty() {
            return None;
        }

        let mut headers: Vec<GridHeader> = columns
            .iter()
            .map(|column| GridHeader {
                field: column.field.clone(),
                label: column.header.clone(),
                sortable: column.sortable,
                sort: sort
                    .filter(|sort| sort.field == column.field)
                    .map(|sort| sort.direction),
            })
            .collect();
        headers.push(GridHeader {
            field: "actions".to_string(),
            label: String::new(),
            sortable: false,
            sort: None,
        });

        let mut seen = BTreeSet::new();
        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let key = row.cell(unique_field).to_string();
                if !seen.insert(key.clone()) {
                    warn!(unique_field, key = %key, "duplicate row key in page");
                }
                GridRowView {
                    key,
                    index,
                    cells: columns.iter().map(|column| column.render_cell(row)).collect(),
                }
            })
            .collect();

        Some(Self { headers, rows })
    }
}

/// Upward pagination event, named the way the list expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub page_no: u32,
    pub page_size: u32,
}

impl From<PageChange> for PaginationModel {
    fn from(change: PageChange) -> Self {
        PaginationModel::new(change.page_no, change.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Rendered before the latest push.
    Stale,
    Loading,
    /// Equal to the current model; a push adopts its model, so echoes land here.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationDecision {
    Forward(PageChange),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridState {
    model: PaginationModel,
    generation: u64,
    pushed: Option<PaginationModel>,
    sort: Option<SortModel>,
}

impl GridState {
    pub fn new(model: PaginationModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn model(&self) -> PaginationModel {
        self.model
    }

    pub fn sort(&self) -> Option<&SortModel> {
        self.sort.as_ref()
    }

    /// Adopts the list's model when it differs from the previous push.
    /// Re-pushing the same model keeps any local change made since.
    pub fn push_external(&mut self, model: PaginationModel) -> u64 {
        if self.pushed != Some(model) {
            self.generation += 1;
            self.pushed = Some(model);
            self.model = model;
        }
        self.generation
    }

    /// Adopts the list's sort without forwarding it back.
    pub fn sync_sort(&mut self, sort: Option<SortModel>) {
        if sort.is_some() {
            self.sort = sort;
        }
    }

    pub fn on_pagination_change(
        &mut self,
        requested: PaginationModel,
        seen_generation: u64,
        loading: bool,
    ) -> PaginationDecision {
        if seen_generation < self.generation {
            return PaginationDecision::Ignored(IgnoreReason::Stale);
        }
        if loading {
            return PaginationDecision::Ignored(IgnoreReason::Loading);
        }
        if requested == self.model {
            return PaginationDecision::Ignored(IgnoreReason::Unchanged);
        }

        self.model = requested;
        PaginationDecision::Forward(PageChange {
            page_no: requested.page,
            page_size: requested.page_size,
        })
    }

    /// An empty model flips the previous direction instead of clearing sort.
    pub fn on_sort_change(&mut self, incoming: Option<SortModel>) -> Option<SortModel> {
        let next = match incoming {
            Some(model) => model,
            None => self.sort.as_ref()?.toggled(),
        };
        self.sort = Some(next.clone());
        Some(next)
    }

    /// Header clicks cycle asc, desc, then the empty model.
    pub fn header_click(&mut self, field: &str) -> Option<SortModel> {
        let incoming = match &self.sort {
            Some(sort) if sort.field == field => match sort.direction {
                SortDirection::Asc => Some(sort.toggled()),
                SortDirection::Desc => None,
            },
            _ => Some(SortModel::asc(field)),
        };
        self.on_sort_change(incoming)
    }

    pub fn page_count(&self, total_elements: u64) -> u64 {
        total_elements.div_ceil(u64::from(self.model.page_size.max(1)))
    }

    pub fn next_page(&self, total_elements: u64) -> Option<PaginationModel> {
        let next = self.model.page + 1;
        (u64::from(next) < self.page_count(total_elements))
            .then(|| PaginationModel::new(next, self.model.page_size))
    }

    pub fn previous_page(&self) -> Option<PaginationModel> {
        self.model
            .page
            .checked_sub(1)
            .map(|page| PaginationModel::new(page, self.model.page_size))
    }

    /// Changing the page size goes back to the first page.
    pub fn with_page_size(&self, page_size: u32) -> PaginationModel {
        PaginationModel::first_page(page_size)
    }
}
