//! Type definitions for the Kubera API payloads.
//!
//! Only the fields the client and CLI read are typed. Everything else the
//! server sends is kept in `extra` so `--raw` output and downstream tools see
//! the full record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A portfolio as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PortfolioSummary {
    /// Portfolio GUID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base currency code (e.g., "USD").
    #[serde(default)]
    pub currency: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A monetary amount.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Money {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Net worth is sent either as a bare number or as a [`Money`] object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NetWorth {
    Amount(f64),
    Money(Money),
}

impl NetWorth {
    pub fn amount(&self) -> Option<f64> {
        match self {
            NetWorth::Amount(amount) => Some(*amount),
            NetWorth::Money(money) => money.amount,
        }
    }

    pub fn currency(&self) -> Option<&str> {
        match self {
            NetWorth::Amount(_) => None,
            NetWorth::Money(money) => money.currency.as_deref(),
        }
    }
}

/// The account an item (e.g. a holding) belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemParent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Aggregator connection details.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub aggregator: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An asset, debt, or insurance line item.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sheet_name: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<Money>,
    #[serde(default)]
    pub cost: Option<Money>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub parent: Option<ItemParent>,
    #[serde(default)]
    pub connection: Option<Connection>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Current value amount, treating a missing value as zero.
    pub fn value_amount(&self) -> f64 {
        self.value.as_ref().and_then(|v| v.amount).unwrap_or(0.0)
    }

    /// Cost basis amount, if the item carries one.
    pub fn cost_amount(&self) -> Option<f64> {
        self.cost.as_ref().and_then(|c| c.amount)
    }

    /// Currency of the value, defaulting to USD.
    pub fn currency(&self) -> &str {
        self.value
            .as_ref()
            .and_then(|v| v.currency.as_deref())
            .unwrap_or("USD")
    }
}

/// Full portfolio data from the detail endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, alias = "net_worth")]
    pub net_worth: Option<NetWorth>,
    #[serde(default)]
    pub asset_total: Option<f64>,
    #[serde(default)]
    pub debt_total: Option<f64>,
    #[serde(default, rename = "asset", alias = "assets")]
    pub assets: Vec<Item>,
    #[serde(default, rename = "debt", alias = "debts")]
    pub debts: Vec<Item>,
    #[serde(default)]
    pub insurance: Vec<Item>,
    #[serde(default, rename = "document", alias = "documents")]
    pub documents: Vec<Value>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortfolioDetail {
    /// Items of one category.
    pub fn items(&self, category: Category) -> &[Item] {
        match category {
            Category::Asset => &self.assets,
            Category::Debt => &self.debts,
            Category::Insurance => &self.insurance,
        }
    }

    /// Items of one category whose sheet name matches, ignoring case.
    pub fn sheet_items(&self, category: Category, sheet_name: &str) -> Vec<&Item> {
        self.items(category)
            .iter()
            .filter(|item| {
                item.sheet_name
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(sheet_name))
            })
            .collect()
    }
}

/// Top-level portfolio categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Asset,
    Debt,
    Insurance,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Asset => write!(f, "asset"),
            Category::Debt => write!(f, "debt"),
            Category::Insurance => write!(f, "insurance"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" | "assets" => Ok(Category::Asset),
            "debt" | "debts" => Ok(Category::Debt),
            "insurance" => Ok(Category::Insurance),
            _ => Err(format!(
                "Invalid category: {s}. Use 'asset', 'debt', or 'insurance'"
            )),
        }
    }
}

/// Fields to change on an asset or debt. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl UpdateItemRequest {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.value.is_none()
            && self.cost.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_serialization() {
        let req = UpdateItemRequest {
            value: Some(50000.0),
            ..Default::default()
        };

        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"value":50000.0}"#);
        assert!(!req.is_empty());
        assert!(UpdateItemRequest::default().is_empty());
    }

    #[test]
    fn test_portfolio_summary_keeps_unknown_fields() {
        let summary: PortfolioSummary = serde_json::from_value(json!({
            "id": "portfolio_001",
            "name": "Test Portfolio 1",
            "currency": "USD",
            "owner": "me"
        }))
        .unwrap();

        assert_eq!(summary.name, "Test Portfolio 1");
        assert_eq!(summary.extra["owner"], "me");

        let back = serde_json::to_value(&summary).unwrap();
        assert_eq!(back["owner"], "me");
    }

    #[test]
    fn test_portfolio_detail_deserialization() {
        let detail: PortfolioDetail = serde_json::from_value(json!({
            "id": "p1",
            "name": "Personal",
            "asset": [{
                "id": "asset_001",
                "name": "Checking",
                "sheetName": "Banks",
                "sectionName": "Cash Accounts",
                "value": {"amount": 5000.0, "currency": "USD"},
                "tickerId": 150
            }],
            "debts": [{"id": "debt_001", "value": {"amount": 250000.0}}],
            "netWorth": {"amount": 320000.0, "currency": "USD"},
            "totalAssets": {"amount": 570000.0, "currency": "USD"}
        }))
        .unwrap();

        assert_eq!(detail.assets.len(), 1);
        assert_eq!(detail.debts.len(), 1);
        assert_eq!(detail.assets[0].sheet_name.as_deref(), Some("Banks"));
        assert_eq!(detail.assets[0].extra["tickerId"], 150);
        assert_eq!(detail.net_worth.as_ref().unwrap().amount(), Some(320000.0));
        assert!(detail.extra.contains_key("totalAssets"));
        assert_eq!(detail.sheet_items(Category::Asset, "banks").len(), 1);
    }

    #[test]
    fn test_net_worth_as_plain_number() {
        let detail: PortfolioDetail = serde_json::from_value(json!({"netWorth": 1234.5})).unwrap();
        assert_eq!(detail.net_worth, Some(NetWorth::Amount(1234.5)));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Asset".parse::<Category>(), Ok(Category::Asset));
        assert_eq!("debt".parse::<Category>(), Ok(Category::Debt));
        assert!("stocks".parse::<Category>().is_err());
    }
}
