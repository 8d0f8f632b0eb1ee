//! Typed binding between filter fields and the list.

use std::collections::BTreeSet;

use crate::domain::entities::query::Filters;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Text { placeholder: String },
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub name: String,
    pub label: String,
    pub kind: FilterKind,
}

impl FilterField {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            name: name.into(),
            kind: FilterKind::Text {
                placeholder: label.clone(),
            },
            label,
        }
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FilterKind::Select { options },
        }
    }
}

/// Form values keyed by field name. Every declared field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterForm {
    initial: Filters,
    values: Filters,
    touched: BTreeSet<String>,
    is_submitting: bool,
}

impl FilterForm {
    pub fn new(fields: &[FilterField]) -> Self {
        let initial: Filters = fields
            .iter()
            .map(|field| (field.name.clone(), String::new()))
            .collect();
        Self {
            values: initial.clone(),
            initial,
            ..Self::default()
        }
    }

    pub fn values(&self) -> &Filters {
        &self.values
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    /// Unknown names are ignored so a field can never add a stray filter.
    pub fn handle_change(&mut self, name: &str, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value.into();
        }
    }

    pub fn handle_blur(&mut self, name: &str) {
        if let Some(value) = self.values.get_mut(name) {
            let trimmed = value.trim().to_string();
            *value = trimmed;
            self.touched.insert(name.to_string());
        }
    }

    pub fn has_values(&self) -> bool {
        self.values.values().any(|value| !value.trim().is_empty())
    }

    /// Starts a submit and hands out the values to apply.
    pub fn begin_submit(&mut self) -> Filters {
        self.is_submitting = true;
        self.values.clone()
    }

    pub fn end_submit(&mut self) {
        self.is_submitting = false;
    }

    /// Clears every field and returns the cleared values.
    pub fn reset_form(&mut self) -> Filters {
        self.values = self.initial.clone();
        self.touched.clear();
        self.is_submitting = false;
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction_fields() -> Vec<FilterField> {
        vec![
            FilterField::text("fiscalCode", "Codice fiscale"),
            FilterField::select(
                "status",
                "Stato",
                vec![
                    SelectOption::new("AUTHORIZED", "Da autorizzare"),
                    SelectOption::new("CAPTURED", "Da rimborsare"),
                ],
            ),
        ]
    }

    #[test]
    fn reset_clears_every_declared_field() {
        let mut form = FilterForm::new(&transaction_fields());
        form.handle_change("fiscalCode", "TESTCF123");
        form.handle_change("status", "CAPTURED");
        assert!(form.has_values());

        let cleared = form.reset_form();

        assert!(!form.has_values());
        assert_eq!(cleared.get("fiscalCode").map(String::as_str), Some(""));
        assert_eq!(cleared.get("status").map(String::as_str), Some(""));
    }

    #[test]
    fn unknown_fields_are_not_added() {
        let mut form = FilterForm::new(&transaction_fields());

        form.handle_change("productName", "Forno");

        assert_eq!(form.values().len(), 2);
        assert_eq!(form.value("productName"), "");
    }

    #[test]
    fn blur_trims_and_marks_touched() {
        let mut form = FilterForm::new(&transaction_fields());

        form.handle_change("fiscalCode", "  RSSMRA80 ");
        form.handle_blur("fiscalCode");

        assert_eq!(form.value("fiscalCode"), "RSSMRA80");
        assert!(form.is_touched("fiscalCode"));
        assert!(!form.is_touched("status"));
    }

    #[test]
    fn submit_flag_brackets_the_request() {
        let mut form = FilterForm::new(&transaction_fields());
        form.handle_change("fiscalCode", "TESTCF123");

        let applied = form.begin_submit();
        assert!(form.is_submitting());
        form.end_submit();

        assert!(!form.is_submitting());
        assert_eq!(applied.get("fiscalCode").map(String::as_str), Some("TESTCF123"));
    }
}
