//! finavatar-ledger: transactions, budget categories, monthly summaries, and CSV exchange

pub mod csv_io;
pub mod ledger;
pub mod records;

pub use csv_io::{export_csv, import_csv, write_csv};
pub use ledger::{BudgetStatus, BudgetUsage, CategoryTotal, Ledger, MonthlyTotals};
pub use records::{
    default_categories, BudgetCategory, NewTransaction, Transaction, TransactionType,
    TransactionUpdate,
};
