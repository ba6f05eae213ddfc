//! Account and balance models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::primitives::AccountId;

/// A bank account owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID
    pub id: AccountId,
    /// Account description, usually the owner's name
    #[serde(default)]
    pub description: String,
    /// When the account was created
    pub created: DateTime<Utc>,
}

/// Response of `/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCollection {
    /// The user's accounts
    pub accounts: Vec<Account>,
}

/// Current balance of an account, from `/balance`.
///
/// Amounts are integers in the minor unit of the currency (pennies for GBP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Available balance
    pub balance: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Amount spent today, negative for outgoing money
    #[serde(default)]
    pub spend_today: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accounts_deserialize() {
        let collection: AccountCollection = serde_json::from_str(
            r#"{
                "accounts": [{
                    "id": "acc_00009237aqC8c5umZmrRdh",
                    "description": "Peter Pan's Account",
                    "created": "2015-11-13T12:17:42Z"
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(collection.accounts.len(), 1);
        let account = &collection.accounts[0];
        assert_eq!(account.id.as_str(), "acc_00009237aqC8c5umZmrRdh");
        assert_eq!(
            account.created,
            Utc.with_ymd_and_hms(2015, 11, 13, 12, 17, 42).unwrap()
        );
    }

    #[test]
    fn test_balance_deserialize() {
        let balance: Balance = serde_json::from_str(
            r#"{"balance": 5000, "currency": "GBP", "spend_today": -1250}"#,
        )
        .unwrap();
        assert_eq!(balance.balance, 5000);
        assert_eq!(balance.spend_today, -1250);
    }
}
