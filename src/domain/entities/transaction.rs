use chrono::NaiveDateTime;

use crate::domain::entities::page::{CellValue, TableRow};

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Authorized,
    Captured,
    Rewarded,
    Invoiced,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 5] = [
        TransactionStatus::Authorized,
        TransactionStatus::Captured,
        TransactionStatus::Rewarded,
        TransactionStatus::Invoiced,
        TransactionStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Authorized => "AUTHORIZED",
            TransactionStatus::Captured => "CAPTURED",
            TransactionStatus::Rewarded => "REWARDED",
            TransactionStatus::Invoiced => "INVOICED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Authorized => "Autorizzata",
            TransactionStatus::Captured => "Da rimborsare",
            TransactionStatus::Rewarded => "Rimborsata",
            TransactionStatus::Invoiced => "Fatturata",
            TransactionStatus::Cancelled => "Annullata",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Which slice of the transaction history a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusScope {
    InProgress,
    Processed,
}

impl StatusScope {
    pub fn statuses(self) -> &'static [TransactionStatus] {
        match self {
            StatusScope::InProgress => &[TransactionStatus::Authorized, TransactionStatus::Captured],
            StatusScope::Processed => &[
                TransactionStatus::Rewarded,
                TransactionStatus::Invoiced,
                TransactionStatus::Cancelled,
            ],
        }
    }

    pub fn contains(self, status: TransactionStatus) -> bool {
        self.statuses().contains(&status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub uuid: String,
    pub trx_code: String,
    pub fiscal_code: String,
    pub status: TransactionStatus,
    pub product_name: Option<String>,
    pub product_gtin: Option<String>,
    pub effective_amount_cents: i64,
    pub reward_amount_cents: i64,
    pub update_date: NaiveDateTime,
    pub invoice_file: Option<String>,
    pub invoice_number: Option<String>,
}

impl Transaction {
    pub fn can_capture(&self) -> bool {
        self.status == TransactionStatus::Authorized
    }

    pub fn can_cancel(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Authorized | TransactionStatus::Captured
        )
    }

    pub fn can_upload_invoice(&self) -> bool {
        self.status == TransactionStatus::Rewarded
    }
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{},{:02} €", cents / 100, cents % 100)
}

impl TableRow for Transaction {
    fn cell(&self, field: &str) -> CellValue {
        match field {
            "id" => self.id.into(),
            "uuid" => self.uuid.as_str().into(),
            "trxCode" => self.trx_code.as_str().into(),
            "fiscalCode" => self.fiscal_code.as_str().into(),
            "status" => self.status.label().into(),
            "additionalProperties" | "productName" => self.product_name.clone().into(),
            "productGtin" => self.product_gtin.clone().into(),
            "effectiveAmountCents" => self.effective_amount_cents.into(),
            "rewardAmountCents" => self.reward_amount_cents.into(),
            "updateDate" => self.update_date.format(DATE_TIME_FORMAT).to_string().into(),
            "invoiceFile" => self.invoice_file.clone().into(),
            "invoiceNumber" => self.invoice_number.clone().into(),
            _ => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_are_formatted_as_euro() {
        assert_eq!(format_cents(12_345), "123,45 €");
        assert_eq!(format_cents(5), "0,05 €");
        assert_eq!(format_cents(-250), "-2,50 €");
    }

    #[test]
    fn scopes_partition_the_statuses() {
        for status in TransactionStatus::ALL {
            let in_progress = StatusScope::InProgress.contains(status);
            let processed = StatusScope::Processed.contains(status);
            assert!(in_progress ^ processed, "{status:?} must be in exactly one scope");
        }
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(
            TransactionStatus::parse("captured"),
            Some(TransactionStatus::Captured)
        );
        assert_eq!(TransactionStatus::parse("UNKNOWN"), None);
    }
}
