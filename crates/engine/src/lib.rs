//! Sharepot engine: the ledger of a two-person household.
//!
//! The pure [`balance`] functions compute who owes whom for a calendar
//! month. [`Engine`] persists expenses, personal advances, reimbursements and
//! recurring templates through sea-orm and drives the recurring lifecycle.

pub use balance::{
    Balance, CategoryTotal, DebtSummary, debts_for_display, expenses_by_category,
    monthly_balance, personal_debt_summary,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{
    ExpenseFilter, NewExpenseCmd, NewPersonalDebtCmd, NewReimbursementCmd, UpdateRecurringCmd,
};
pub use error::EngineError;
pub use expenses::{Category, Expense, PaymentMethod};
pub use household::Participants;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, MonthlyReport, RecurringUpdate, UNKNOWN_PARTICIPANT};
pub use period::Period;
pub use personal_debts::PersonalDebt;
pub use recurring::{Recurrence, RecurringExpense};
pub use reimbursements::Reimbursement;

pub mod balance;
mod clock;
mod commands;
mod error;
mod expenses;
mod household;
mod money;
mod ops;
mod period;
mod personal_debts;
mod recurring;
mod reimbursement_debts;
mod reimbursements;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
