use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_utils::is_iso_date;
use crate::models::category::Category;
use crate::money::{parse_cents, MAX_AMOUNT_CENTS};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(()),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// A stored income or expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub title: String,
    /// Non-negative magnitude; the direction comes from `kind`.
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    /// `YYYY-MM-DD`
    pub date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// `YYYY-MM` part of the date.
    pub fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }

    /// Check the shape every aggregation relies on.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(format!("Transaction {} has an empty title", self.id));
        }
        if self.amount_cents < 0 {
            return Err(format!("Transaction {} has a negative amount", self.id));
        }
        if self.amount_cents > MAX_AMOUNT_CENTS {
            return Err(format!("Transaction {} exceeds the amount limit", self.id));
        }
        if !is_iso_date(&self.date) {
            return Err(format!(
                "Transaction {} has a malformed date: {}",
                self.id, self.date
            ));
        }
        Ok(())
    }
}

/// Request body for creating or replacing a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub title: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: String,
    #[serde(rename = "type", default)]
    pub kind: TransactionType,
    #[serde(default)]
    pub category: Category,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated [`NewTransaction`], ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub title: String,
    pub amount_cents: i64,
    pub kind: TransactionType,
    pub category: Category,
    pub date: String,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn validate(self) -> Result<TransactionDraft, String> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err("Title is required".into());
        }

        let amount_cents = parse_cents(&self.amount)?;

        let date = self.date.trim().to_string();
        if !is_iso_date(&date) {
            return Err(format!("Date must be YYYY-MM-DD: {}", self.date));
        }

        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(TransactionDraft {
            title,
            amount_cents,
            kind: self.kind,
            category: self.category,
            date,
            notes,
        })
    }
}

/// Accept the amount either as a JSON number or as decimal text.
///
/// Numbers are taken through their shortest textual form so `12.3` stays
/// `12.3` instead of picking up binary floating point noise.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n.to_string(),
        RawAmount::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_transaction(amount: serde_json::Value, date: &str) -> NewTransaction {
        serde_json::from_value(serde_json::json!({
            "title": "Lunch",
            "amount": amount,
            "type": "expense",
            "category": "Food",
            "date": date,
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_number_amount() {
        let draft = new_transaction(serde_json::json!(12.3), "2024-01-05")
            .validate()
            .unwrap();
        assert_eq!(draft.amount_cents, 1230);
        assert_eq!(draft.category, Category::Food);
        assert_eq!(draft.kind, TransactionType::Expense);
    }

    #[test]
    fn test_validate_text_amount() {
        let draft = new_transaction(serde_json::json!("1500.75"), "2024-01-05")
            .validate()
            .unwrap();
        assert_eq!(draft.amount_cents, 150_075);
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        assert!(new_transaction(serde_json::json!(-5), "2024-01-05")
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_amount_above_limit() {
        for amount in [serde_json::json!("92233720368547758"), serde_json::json!(1e12)] {
            assert!(new_transaction(amount, "2024-01-05").validate().is_err());
        }
        let draft = new_transaction(serde_json::json!("100000000000"), "2024-01-05")
            .validate()
            .unwrap();
        assert_eq!(draft.amount_cents, MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_check_invariants_rejects_amount_above_limit() {
        let tx = Transaction {
            id: "big".into(),
            title: "Windfall".into(),
            amount_cents: MAX_AMOUNT_CENTS + 1,
            kind: TransactionType::Income,
            category: Category::Other,
            date: "2024-01-05".into(),
            notes: None,
            created_at: "2024-01-05T00:00:00Z".into(),
        };
        assert!(tx.check_invariants().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_dates() {
        for date in ["2024-1-5", "2024/01/05", "2024-02-30", "05-01-2024", ""] {
            assert!(
                new_transaction(serde_json::json!(1), date).validate().is_err(),
                "{} should be rejected",
                date
            );
        }
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut tx = new_transaction(serde_json::json!(1), "2024-01-05");
        tx.title = "   ".into();
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_defaults_match_entry_form() {
        let tx: NewTransaction = serde_json::from_value(serde_json::json!({
            "title": "Misc",
            "amount": 1,
            "date": "2024-01-05",
        }))
        .unwrap();
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category, Category::Other);
    }

    #[test]
    fn test_unknown_enum_values_fail_to_deserialize() {
        let result: Result<NewTransaction, _> = serde_json::from_value(serde_json::json!({
            "title": "Misc",
            "amount": 1,
            "type": "transfer",
            "date": "2024-01-05",
        }));
        assert!(result.is_err());

        let result: Result<NewTransaction, _> = serde_json::from_value(serde_json::json!({
            "title": "Misc",
            "amount": 1,
            "category": "Groceries",
            "date": "2024-01-05",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let tx = Transaction {
            id: "a".into(),
            title: "Salary".into(),
            amount_cents: 100_000,
            kind: TransactionType::Income,
            category: Category::Other,
            date: "2024-01-05".into(),
            notes: None,
            created_at: "2024-01-05T00:00:00Z".into(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "income");
        assert_eq!(value["category"], "Other");
        assert_eq!(tx.month(), "2024-01");
    }
}
