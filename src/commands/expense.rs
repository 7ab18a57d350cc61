use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use std::error::Error;

use super::OutputFormat;
use crate::db::ExpenseRepository;
use crate::models::NewExpense;

#[derive(Args)]
pub struct ExpenseCommand {
    #[command(subcommand)]
    pub command: ExpenseSubcommand,
}

#[derive(Subcommand)]
pub enum ExpenseSubcommand {
    /// Log an expense
    Add {
        /// Category: fuel, toll, food, maintenance or other
        category: String,

        /// Amount spent (must be positive)
        amount: f64,

        /// Payment mode: cash, upi, card or other
        #[arg(long, default_value = "cash")]
        payment: String,

        /// Vendor name
        #[arg(long)]
        vendor: Option<String>,

        /// Receipt photo URL
        #[arg(long)]
        receipt_url: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Date of the expense (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// List all expenses
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ExpenseCommand {
    pub async fn run(&self, repo: &ExpenseRepository) -> Result<(), Box<dyn Error>> {
        match &self.command {
            ExpenseSubcommand::Add {
                category,
                amount,
                payment,
                vendor,
                receipt_url,
                notes,
                date,
            } => {
                let expense = NewExpense {
                    category: category.parse()?,
                    amount: *amount,
                    payment_mode: payment.parse()?,
                    vendor: vendor.clone(),
                    receipt_url: receipt_url.clone(),
                    notes: notes.clone(),
                    occurred_on: match date {
                        Some(d) => d.parse::<NaiveDate>()?,
                        None => Utc::now().date_naive(),
                    },
                };
                repo.insert(&expense).await?;

                let expenses = repo.fetch_all().await?;
                println!("Expense logged ({} total).", expenses.len());
            }
            ExpenseSubcommand::List { format } => {
                let expenses = repo.fetch_all().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&expenses)?),
                    OutputFormat::Text => {
                        if expenses.is_empty() {
                            println!("No expenses recorded.");
                        }
                        for expense in expenses {
                            let synced = if expense.synced { "synced" } else { "unsynced" };
                            println!(
                                "#{} {} {:.2} via {} on {} ({})",
                                expense.id,
                                expense.category,
                                expense.amount,
                                expense.payment_mode,
                                expense.occurred_on,
                                synced
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
