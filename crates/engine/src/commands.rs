//! Command structs for engine write operations.
//!
//! These types group parameters for creations and updates, keeping call sites
//! readable and avoiding long argument lists. Validation happens in the
//! engine, not here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Category, MoneyCents, PaymentMethod, Recurrence};

/// Create an expense, optionally turning it into a recurring template.
#[derive(Clone, Debug)]
pub struct NewExpenseCmd {
    pub amount: MoneyCents,
    pub date: DateTime<Utc>,
    pub paid_by: String,
    pub added_by: String,
    pub description: String,
    pub payment_method: Option<PaymentMethod>,
    pub bank_account: Option<String>,
    pub category: Option<Category>,
    pub recurrence: Option<Recurrence>,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(
        amount: MoneyCents,
        date: DateTime<Utc>,
        paid_by: impl Into<String>,
        added_by: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            date,
            paid_by: paid_by.into(),
            added_by: added_by.into(),
            description: description.into(),
            payment_method: None,
            bank_account: None,
            category: None,
            recurrence: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    #[must_use]
    pub fn bank_account(mut self, account: impl Into<String>) -> Self {
        self.bank_account = Some(account.into());
        self
    }

    /// Also create a recurring template starting at this expense.
    #[must_use]
    pub fn recurring(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }
}

/// Filters for listing expenses. Bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub paid_by: Option<String>,
}

/// Patch a recurring template. `None` keeps the current value; for the
/// optional fields `Some(None)` clears them.
#[derive(Clone, Debug, Default)]
pub struct UpdateRecurringCmd {
    pub id: Uuid,
    pub amount: Option<MoneyCents>,
    pub paid_by: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<Option<PaymentMethod>>,
    pub bank_account: Option<Option<String>>,
    pub category: Option<Option<Category>>,
    pub recurrence: Option<Recurrence>,
    pub is_active: Option<bool>,
}

impl UpdateRecurringCmd {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn paid_by(mut self, paid_by: impl Into<String>) -> Self {
        self.paid_by = Some(paid_by.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: Option<PaymentMethod>) -> Self {
        self.payment_method = Some(method);
        self
    }

    #[must_use]
    pub fn bank_account(mut self, account: Option<String>) -> Self {
        self.bank_account = Some(account);
        self
    }

    #[must_use]
    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Record a personal advance.
#[derive(Clone, Debug)]
pub struct NewPersonalDebtCmd {
    pub amount: MoneyCents,
    pub paid_by: String,
    pub owed_by: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub added_by: String,
}

impl NewPersonalDebtCmd {
    #[must_use]
    pub fn new(
        amount: MoneyCents,
        paid_by: impl Into<String>,
        owed_by: impl Into<String>,
        description: impl Into<String>,
        date: DateTime<Utc>,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            paid_by: paid_by.into(),
            owed_by: owed_by.into(),
            description: description.into(),
            date,
            added_by: added_by.into(),
        }
    }
}

/// Record a reimbursement, optionally settling personal debts.
#[derive(Clone, Debug)]
pub struct NewReimbursementCmd {
    pub amount: MoneyCents,
    pub from: String,
    pub to: String,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
    pub settles: Vec<Uuid>,
}

impl NewReimbursementCmd {
    #[must_use]
    pub fn new(
        amount: MoneyCents,
        from: impl Into<String>,
        to: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            from: from.into(),
            to: to.into(),
            date,
            note: None,
            settles: Vec::new(),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn settles(mut self, debt_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.settles.extend(debt_ids);
        self
    }
}
