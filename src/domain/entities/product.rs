use crate::domain::entities::page::{CellValue, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub gtin_code: String,
    pub product_name: String,
    pub category: String,
    pub brand: Option<String>,
    pub energy_class: Option<String>,
}

impl TableRow for Product {
    fn cell(&self, field: &str) -> CellValue {
        match field {
            "gtinCode" => self.gtin_code.as_str().into(),
            "productName" => self.product_name.as_str().into(),
            "category" => self.category.as_str().into(),
            "brand" => self.brand.clone().into(),
            "energyClass" => self.energy_class.clone().into(),
            _ => CellValue::Null,
        }
    }
}
