use sqlx::SqlitePool;

use super::StoreError;
use crate::models::{Expense, NewExpense};

pub struct ExpenseRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    category: String,
    amount: f64,
    payment_mode: String,
    vendor: Option<String>,
    receipt_url: Option<String>,
    notes: Option<String>,
    occurred_on: String,
    synced: i64,
}

impl ExpenseRow {
    fn into_expense(self) -> Result<Expense, StoreError> {
        Ok(Expense {
            id: self.id,
            category: self.category.parse().map_err(StoreError::Validation)?,
            amount: self.amount,
            payment_mode: self.payment_mode.parse().map_err(StoreError::Validation)?,
            vendor: self.vendor,
            receipt_url: self.receipt_url,
            notes: self.notes,
            occurred_on: self
                .occurred_on
                .parse()
                .map_err(|e| StoreError::Validation(format!("invalid date: {}", e)))?,
            synced: self.synced != 0,
        })
    }
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new expense with `synced = false`. The amount must be
    /// strictly positive.
    pub async fn insert(&self, expense: &NewExpense) -> Result<(), StoreError> {
        if !(expense.amount > 0.0) {
            return Err(StoreError::Validation(
                "expense amount must be greater than zero".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO expenses (category, amount, payment_mode, vendor, receipt_url, notes, occurred_on, synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(expense.category.to_string())
        .bind(expense.amount)
        .bind(expense.payment_mode.to_string())
        .bind(&expense.vendor)
        .bind(&expense.receipt_url)
        .bind(&expense.notes)
        .bind(expense.occurred_on.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full table scan in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<Expense>, StoreError> {
        let rows: Vec<ExpenseRow> = sqlx::query_as("SELECT * FROM expenses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }
}
