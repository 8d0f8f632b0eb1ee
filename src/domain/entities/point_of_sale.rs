#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOfSale {
    pub id: String,
    pub business_name: String,
    pub vat_number: String,
    pub address: String,
    pub city: String,
    pub contact_email: String,
    pub website: Option<String>,
}
