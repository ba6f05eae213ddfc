//! Transaction and merchant models.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::primitives::{MerchantId, TransactionId};

/// A single card payment, top-up or transfer on an account.
///
/// Amounts are integers in the minor unit of the currency; outgoing money is
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: TransactionId,
    /// When the transaction was created
    pub created: DateTime<Utc>,
    /// Amount in minor units
    pub amount: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Account balance after this transaction
    #[serde(default)]
    pub account_balance: i64,
    /// Merchant, as an ID or expanded with `expand[]=merchant`
    #[serde(default)]
    pub merchant: Option<Merchant>,
    /// Statement description
    #[serde(default)]
    pub description: String,
    /// Why the transaction was declined, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    /// Whether this is a top-up
    #[serde(default)]
    pub is_load: bool,
    /// When the transaction settled; `None` while pending
    #[serde(default, deserialize_with = "settled_timestamp")]
    pub settled: Option<DateTime<Utc>>,
    /// Spending category, e.g. `eating_out`
    #[serde(default)]
    pub category: String,
    /// Key/value annotations
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// User notes
    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    /// Returns `true` if the transaction was declined.
    pub fn is_declined(&self) -> bool {
        self.decline_reason.is_some()
    }
}

// Pending transactions report `"settled": ""` rather than omitting the field.
fn settled_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}

/// Response of `/transactions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The transaction
    pub transaction: Transaction,
}

/// Response of `/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// One page of transactions, oldest first
    pub transactions: Vec<Transaction>,
}

/// The merchant of a transaction.
///
/// The API sends a bare merchant ID unless the request asked for merchants
/// to be expanded, in which case it sends the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Merchant {
    /// Only the merchant ID
    Id(MerchantId),
    /// The full merchant record
    Expanded(Box<MerchantDetails>),
}

impl Merchant {
    /// The merchant ID, available in either form.
    pub fn id(&self) -> &MerchantId {
        match self {
            Merchant::Id(id) => id,
            Merchant::Expanded(details) => &details.id,
        }
    }

    /// The full merchant record, if it was expanded.
    pub fn details(&self) -> Option<&MerchantDetails> {
        match self {
            Merchant::Id(_) => None,
            Merchant::Expanded(details) => Some(details),
        }
    }
}

/// An expanded merchant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantDetails {
    /// Unique merchant ID
    pub id: MerchantId,
    /// Merchant name
    #[serde(default)]
    pub name: String,
    /// When the merchant was first seen
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// Merchant location
    #[serde(default)]
    pub address: Option<MerchantAddress>,
    /// Group ID shared by merchants of the same chain
    #[serde(default)]
    pub group_id: String,
    /// Logo URL
    #[serde(default)]
    pub logo: String,
    /// Emoji for the merchant
    #[serde(default)]
    pub emoji: String,
    /// Merchant category
    #[serde(default)]
    pub category: String,
}

/// Where a merchant is located.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAddress {
    /// Street address
    #[serde(default)]
    pub address: String,
    /// City
    #[serde(default)]
    pub city: String,
    /// Country code
    #[serde(default)]
    pub country: String,
    /// Latitude
    #[serde(default)]
    pub latitude: f64,
    /// Longitude
    #[serde(default)]
    pub longitude: f64,
    /// Postcode
    #[serde(default)]
    pub postcode: String,
    /// Region
    #[serde(default)]
    pub region: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_merchant_from_string() {
        let merchant: Merchant = serde_json::from_str(r#""merch_0123456789""#).unwrap();
        assert_eq!(merchant, Merchant::Id(MerchantId::new("merch_0123456789")));
        assert!(merchant.details().is_none());
    }

    #[test]
    fn test_merchant_from_object() {
        let merchant: Merchant = serde_json::from_str(
            r#"{
                "id": "merch_id",
                "name": "TestMerch",
                "created": "2016-02-09T12:30:35.000Z",
                "group_id": "grp_abcde",
                "logo": "http://company.com/logo.png",
                "emoji": "🔧",
                "category": "shopping"
            }"#,
        )
        .unwrap();

        assert_eq!(merchant.id().as_str(), "merch_id");
        let details = merchant.details().unwrap();
        assert_eq!(details.name, "TestMerch");
        assert_eq!(
            details.created,
            Some(Utc.with_ymd_and_hms(2016, 2, 9, 12, 30, 35).unwrap())
        );
        assert_eq!(details.emoji, "🔧");
        assert!(details.address.is_none());
    }

    #[test]
    fn test_transaction_deserialize() {
        let response: TransactionsResponse = serde_json::from_str(
            r#"{
                "transactions": [{
                    "account_balance": 13013,
                    "amount": -510,
                    "created": "2015-08-22T12:20:18Z",
                    "currency": "GBP",
                    "description": "THE DE BEAUVOIR DELI C LONDON GBR",
                    "id": "tx_00008zIcpb1TB4yeIFXMzx",
                    "merchant": "merch_00008zIcpbAKe8shBxXUtl",
                    "metadata": {},
                    "notes": "Salmon sandwich 🍞",
                    "is_load": false,
                    "settled": "2015-08-23T12:20:18Z",
                    "category": "eating_out"
                }, {
                    "account_balance": 12503,
                    "amount": -679,
                    "created": "2015-08-23T16:15:03Z",
                    "currency": "GBP",
                    "description": "VUE BSL LTD LONDON GBR",
                    "id": "tx_00008zL2INM3xZ41THuRF3",
                    "merchant": null,
                    "metadata": {"note": "cinema"},
                    "is_load": false,
                    "settled": "",
                    "decline_reason": "INSUFFICIENT_FUNDS"
                }]
            }"#,
        )
        .unwrap();

        let first = &response.transactions[0];
        assert_eq!(first.amount, -510);
        assert_eq!(
            first.merchant.as_ref().map(|m| m.id().as_str()),
            Some("merch_00008zIcpbAKe8shBxXUtl")
        );
        assert_eq!(
            first.settled,
            Some(Utc.with_ymd_and_hms(2015, 8, 23, 12, 20, 18).unwrap())
        );
        assert!(!first.is_declined());

        let second = &response.transactions[1];
        assert!(second.merchant.is_none());
        assert!(second.settled.is_none());
        assert!(second.is_declined());
        assert_eq!(second.metadata.get("note").map(String::as_str), Some("cinema"));
    }
}
