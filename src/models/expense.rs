use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Fuel,
    Toll,
    Food,
    Maintenance,
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseCategory::Fuel => write!(f, "Fuel"),
            ExpenseCategory::Toll => write!(f, "Toll"),
            ExpenseCategory::Food => write!(f, "Food"),
            ExpenseCategory::Maintenance => write!(f, "Maintenance"),
            ExpenseCategory::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fuel" => Ok(ExpenseCategory::Fuel),
            "toll" => Ok(ExpenseCategory::Toll),
            "food" => Ok(ExpenseCategory::Food),
            "maintenance" => Ok(ExpenseCategory::Maintenance),
            "other" => Ok(ExpenseCategory::Other),
            _ => Err(format!(
                "Invalid expense category '{}'. Valid options: fuel, toll, food, maintenance, other",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    Other,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Cash => write!(f, "Cash"),
            PaymentMode::Upi => write!(f, "UPI"),
            PaymentMode::Card => write!(f, "Card"),
            PaymentMode::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            "card" => Ok(PaymentMode::Card),
            "other" => Ok(PaymentMode::Other),
            _ => Err(format!(
                "Invalid payment mode '{}'. Valid options: cash, upi, card, other",
                s
            )),
        }
    }
}

/// A single logged expense. Amount must be positive at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
    pub occurred_on: NaiveDate,
    pub synced: bool,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub vendor: Option<String>,
    pub receipt_url: Option<String>,
    pub notes: Option<String>,
    pub occurred_on: NaiveDate,
}
