use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const PAGE_SIZE_OPTIONS: [u32; 3] = [10, 25, 50];

/// Form field name to value. Empty strings are kept: the backend decides
/// whether an empty value means "no filter".
pub type Filters = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortModel {
    pub field: String,
    pub direction: SortDirection,
}

impl SortModel {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    pub fn toggled(&self) -> Self {
        Self::new(self.field.clone(), self.direction.toggled())
    }

    /// Wire form `"field,direction"`, with the field passed through the synonym table.
    pub fn to_wire(&self, synonyms: &SortSynonyms) -> String {
        format!("{},{}", synonyms.resolve(&self.field), self.direction)
    }

    /// Parses the wire form back. Used by the local backend.
    pub fn parse_wire(value: &str) -> Option<Self> {
        let (field, direction) = value.split_once(',')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, SortDirection::parse(direction)?))
    }
}

/// UI column names that the backend knows under a different field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSynonyms(BTreeMap<String, String>);

impl SortSynonyms {
    pub fn none() -> Self {
        Self::default()
    }

    /// The transactions grid shows the product name out of `additionalProperties`,
    /// which the backend sorts as `productName`.
    pub fn transactions() -> Self {
        Self::none().with("additionalProperties", "productName")
    }

    pub fn with(mut self, ui_field: impl Into<String>, wire_field: impl Into<String>) -> Self {
        self.0.insert(ui_field.into(), wire_field.into());
        self
    }

    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.0.get(field).map(String::as_str).unwrap_or(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaginationModel {
    pub page: u32,
    pub page_size: u32,
}

impl PaginationModel {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.max(1),
        }
    }

    pub fn first_page(page_size: u32) -> Self {
        Self::new(0, page_size)
    }
}

impl Default for PaginationModel {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}

/// What the next fetch asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub filters: Filters,
    pub sort: Option<SortModel>,
    pub page: u32,
    pub page_size: u32,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: Filters::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn pagination(&self) -> PaginationModel {
        PaginationModel::new(self.page, self.page_size)
    }

    pub fn to_params(&self, synonyms: &SortSynonyms) -> ListParams {
        ListParams {
            page: self.page,
            size: self.page_size,
            sort: self.sort.as_ref().map(|sort| sort.to_wire(synonyms)),
            filters: self.filters.clone(),
        }
    }
}

/// Parameters handed to a list fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListParams {
    pub page: u32,
    pub size: u32,
    pub sort: Option<String>,
    pub filters: Filters,
}

impl ListParams {
    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_field_is_translated_on_the_wire() {
        let synonyms = SortSynonyms::transactions();

        assert_eq!(
            SortModel::asc("additionalProperties").to_wire(&synonyms),
            "productName,asc"
        );
        assert_eq!(
            SortModel::desc("updateDate").to_wire(&synonyms),
            "updateDate,desc"
        );
    }

    #[test]
    fn wire_sort_parses_back() {
        assert_eq!(
            SortModel::parse_wire("productName,desc"),
            Some(SortModel::desc("productName"))
        );
        assert_eq!(SortModel::parse_wire("productName"), None);
        assert_eq!(SortModel::parse_wire(",asc"), None);
        assert_eq!(SortModel::parse_wire("name,sideways"), None);
    }

    #[test]
    fn params_skip_blank_filters_on_lookup() {
        let mut state = QueryState::new(25);
        state.filters.insert("fiscalCode".to_string(), "  ".to_string());
        state.filters.insert("status".to_string(), "CAPTURED".to_string());

        let params = state.to_params(&SortSynonyms::none());

        assert_eq!(params.size, 25);
        assert_eq!(params.filter("fiscalCode"), None);
        assert_eq!(params.filter("status"), Some("CAPTURED"));
        assert_eq!(params.filters.get("fiscalCode").map(String::as_str), Some("  "));
    }

    #[test]
    fn page_size_is_never_zero() {
        assert_eq!(PaginationModel::new(3, 0).page_size, 1);
        assert_eq!(QueryState::new(0).page_size, 1);
    }
}
