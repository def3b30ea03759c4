//! Currency amounts.

use crate::errors::{LinkedInError, LinkedInResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Money as LinkedIn expects it on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as a string, e.g. `"50.00"`.
    pub amount: String,
    /// ISO 4217 code, e.g. `"USD"`.
    pub currency_code: String,
}

/// Money as accepted from tool input.
#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MoneyInput {
    /// Positive amount, rounded to two decimals.
    pub amount: f64,
    /// Three-letter currency code such as USD.
    #[schemars(regex(pattern = r"^[A-Z]{3}$"))]
    pub currency_code: String,
}

impl MoneyInput {
    /// Validates and converts to wire money; `field` names the input on error.
    pub fn to_money(&self, field: &str) -> LinkedInResult<Money> {
        Money::new(field, self.amount, &self.currency_code)
    }
}

/// Money in tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyOutput {
    /// Decimal amount.
    pub amount: String,
    /// Currency code.
    pub currency_code: String,
}

impl From<Money> for MoneyOutput {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount,
            currency_code: money.currency_code,
        }
    }
}

impl Money {
    /// Builds a money object, rejecting non-positive amounts and malformed codes.
    pub fn new(field: &str, amount: f64, currency_code: &str) -> LinkedInResult<Self> {
        // Checked after rounding so a positive input never goes out as "0.00".
        let rounded = (amount * 100.0).round() / 100.0;
        if !rounded.is_finite() || rounded <= 0.0 {
            return Err(LinkedInError::validation(field, "amount must be at least 0.01"));
        }
        if currency_code.len() != 3 || !currency_code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(LinkedInError::validation(
                field,
                format!("'{}' is not a three-letter currency code", currency_code),
            ));
        }

        Ok(Self {
            amount: format!("{:.2}", rounded),
            currency_code: currency_code.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        let money = Money::new("daily_budget", 50.0, "USD").unwrap();
        assert_eq!(money.amount, "50.00");
        assert_eq!(
            serde_json::to_value(&money).unwrap(),
            serde_json::json!({"amount": "50.00", "currencyCode": "USD"})
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Money::new("daily_budget", 0.0, "USD").is_err());
        assert!(Money::new("daily_budget", 10.0, "usd").is_err());
        assert!(Money::new("daily_budget", f64::NAN, "EUR").is_err());
    }

    #[test]
    fn sub_cent_amounts_are_rejected() {
        let err = Money::new("daily_budget", 0.004, "USD").unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "daily_budget"));
        assert_eq!(Money::new("daily_budget", 0.005, "USD").unwrap().amount, "0.01");
        assert_eq!(Money::new("daily_budget", 19.999, "USD").unwrap().amount, "20.00");
    }
}
