use serde::{Deserialize, Serialize};

pub const DISCOUNT_CODE_LEN: usize = 8;

/// Session storage key of the in-progress "accept discount" draft.
pub const DISCOUNT_COUPON_KEY: &str = "discountCoupon";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPreview {
    pub code: String,
    pub fiscal_code: String,
    pub product_name: Option<String>,
    pub product_gtin: Option<String>,
    pub amount_cents: i64,
    pub reward_cents: i64,
    pub expires_at: String,
}

impl DiscountPreview {
    pub fn residual_cents(&self) -> i64 {
        self.amount_cents - self.reward_cents
    }
}

/// What survives page navigation while a merchant accepts a code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDraft {
    pub code: String,
    pub preview: Option<DiscountPreview>,
}

/// Upper-cases and strips whitespace the way merchants tend to type codes.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == DISCOUNT_CODE_LEN && code.chars().all(|ch| ch.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_normalized_before_validation() {
        let code = normalize_code(" ab12 cd34 ");
        assert_eq!(code, "AB12CD34");
        assert!(is_valid_code_format(&code));
        assert!(!is_valid_code_format("AB12CD3"));
        assert!(!is_valid_code_format("AB12CD3!"));
    }

    #[test]
    fn draft_serializes_with_camel_case_keys() {
        let draft = DiscountDraft {
            code: "AB12CD34".to_string(),
            preview: Some(DiscountPreview {
                code: "AB12CD34".to_string(),
                fiscal_code: "RSSMRA80A01H501U".to_string(),
                product_name: None,
                product_gtin: None,
                amount_cents: 10_000,
                reward_cents: 3_000,
                expires_at: "2030-01-01 00:00:00".to_string(),
            }),
        };

        let json = serde_json::to_string(&draft).expect("draft should serialize");
        assert!(json.contains("\"fiscalCode\""));
        let back: DiscountDraft = serde_json::from_str(&json).expect("draft should deserialize");
        assert_eq!(back, draft);
    }
}
