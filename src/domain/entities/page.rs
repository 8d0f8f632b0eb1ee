use std::fmt;

pub const MISSING_DATA_PLACEHOLDER: &str = "-";

/// A single cell as seen by the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
}

impl CellValue {
    /// Null, absent and empty text count as missing. `0` and `false` do not.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn display_or(&self, placeholder: &str) -> String {
        if self.is_missing() {
            placeholder.to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Decimal(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(flag) => CellValue::Bool(*flag),
            serde_json::Value::Number(number) => number
                .as_i64()
                .map(CellValue::Integer)
                .or_else(|| number.as_f64().map(CellValue::Decimal))
                .unwrap_or(CellValue::Null),
            serde_json::Value::String(text) => CellValue::Text(text.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Rows hand cells to the grid by field name. Unknown fields are `Null`.
pub trait TableRow {
    fn cell(&self, field: &str) -> CellValue;
}

impl TableRow for serde_json::Value {
    fn cell(&self, field: &str) -> CellValue {
        self.get(field).map(CellValue::from).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_null_and_empty_text_are_missing() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::from("").is_missing());
        assert!(!CellValue::from(0_i64).is_missing());
        assert!(!CellValue::from(false).is_missing());
        assert!(!CellValue::from(" ").is_missing());
    }

    #[test]
    fn json_rows_expose_absent_fields_as_null() {
        let row = json!({ "id": 7, "name": "Forno", "price": 0, "active": false });

        assert_eq!(row.cell("id"), CellValue::Integer(7));
        assert_eq!(row.cell("missing"), CellValue::Null);
        assert_eq!(row.cell("price").display_or("-"), "0");
        assert_eq!(row.cell("active").display_or("-"), "false");
    }
}
