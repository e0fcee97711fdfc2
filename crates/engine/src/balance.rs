//! Monthly balance between the two participants.
//!
//! Everything here is pure: collections in, summary out. Callers pass the
//! full, unfiltered collections and the functions pick the records that
//! belong to the period.
//!
//! # Debt scope
//!
//! Personal debts count toward a month when they are dated inside it (paid or
//! not) or when they are dated earlier and still unpaid. An open advance
//! therefore keeps weighing on every following month until it is settled.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Category, Expense, MoneyCents, Participants, Period, PersonalDebt, Reimbursement};

/// Result of [`monthly_balance`].
///
/// When `owed_amount` is zero the direction fields still hold the pair in
/// the `participant1 owes participant2` order; callers should check
/// [`Balance::is_settled`] before displaying a direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub participant1: String,
    pub participant2: String,
    pub person1_total: MoneyCents,
    pub person2_total: MoneyCents,
    pub total_expenses: MoneyCents,
    pub owed_amount: MoneyCents,
    pub owed_by: String,
    pub owed_to: String,
}

impl Balance {
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.owed_amount.is_zero()
    }
}

/// Unpaid advances owed by each participant, outside the shared pot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub person1_owes: MoneyCents,
    pub person2_owes: MoneyCents,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: MoneyCents,
}

fn debt_in_scope(debt: &PersonalDebt, period: &Period) -> bool {
    period.contains(debt.date) || (period.is_before(debt.date) && !debt.is_paid)
}

/// Sign of a record for participant 1: `-1` for participant 1, `+1` for
/// participant 2, `0` for anybody else.
fn side(participants: &Participants, who: &str) -> i64 {
    if !participants.contains(who) {
        0
    } else if who == participants.first() {
        -1
    } else {
        1
    }
}

/// Computes who owes whom for `period`.
///
/// Shared expenses are split 50/50. A reimbursement sent by participant 1
/// lowers what participant 1 still owes, one sent by participant 2 raises it.
/// Debts owed by participant 1 count against participant 1, and conversely.
pub fn monthly_balance(
    expenses: &[Expense],
    participants: &Participants,
    period: &Period,
    personal_debts: &[PersonalDebt],
    reimbursements: &[Reimbursement],
) -> Balance {
    let mut person1_total = MoneyCents::ZERO;
    let mut person2_total = MoneyCents::ZERO;
    for expense in expenses.iter().filter(|e| period.contains(e.date)) {
        match side(participants, &expense.paid_by) {
            -1 => person1_total += expense.amount,
            1 => person2_total += expense.amount,
            _ => {}
        }
    }

    let reimbursement_adjustment: MoneyCents = reimbursements
        .iter()
        .filter(|r| period.contains(r.date))
        .map(|r| MoneyCents::new(side(participants, &r.from).saturating_mul(r.amount.cents())))
        .sum();

    let debt_adjustment: MoneyCents = personal_debts
        .iter()
        .filter(|d| debt_in_scope(d, period))
        .map(|d| MoneyCents::new(side(participants, &d.owed_by).saturating_mul(d.amount.cents())))
        .sum();

    let total_expenses = person1_total + person2_total;

    // 2 * (p1 - total / 2 + adjustments), kept doubled so the half never
    // truncates a cent.
    let doubled_difference = person1_total - person2_total
        + MoneyCents::new((reimbursement_adjustment + debt_adjustment).cents().saturating_mul(2));

    let (owed_by, owed_to) = if doubled_difference.is_positive() {
        (participants.second(), participants.first())
    } else {
        (participants.first(), participants.second())
    };

    Balance {
        participant1: participants.first().to_string(),
        participant2: participants.second().to_string(),
        person1_total,
        person2_total,
        total_expenses,
        owed_amount: doubled_difference.abs().half_rounded(),
        owed_by: owed_by.to_string(),
        owed_to: owed_to.to_string(),
    }
}

/// Unpaid advances per debtor over the same debt scope as
/// [`monthly_balance`].
pub fn personal_debt_summary(
    personal_debts: &[PersonalDebt],
    participants: &Participants,
    period: &Period,
) -> DebtSummary {
    personal_debts
        .iter()
        .filter(|d| !d.is_paid && debt_in_scope(d, period))
        .fold(DebtSummary::default(), |mut acc, debt| {
            match side(participants, &debt.owed_by) {
                -1 => acc.person1_owes += debt.amount,
                1 => acc.person2_owes += debt.amount,
                _ => {}
            }
            acc
        })
}

/// Totals per category for the expenses of `period`. Expenses without a
/// category land in [`Category::Other`].
pub fn expenses_by_category(expenses: &[Expense], period: &Period) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Category, MoneyCents> = HashMap::new();
    for expense in expenses.iter().filter(|e| period.contains(e.date)) {
        *totals
            .entry(expense.category.unwrap_or(Category::Other))
            .or_default() += expense.amount;
    }

    Category::ALL
        .into_iter()
        .filter_map(|category| {
            totals
                .get(&category)
                .map(|total| CategoryTotal {
                    category,
                    total: *total,
                })
        })
        .collect()
}

/// Advances to list for a month: paid ones dated in the month, or unpaid ones
/// dated in the month or earlier.
pub fn debts_for_display<'a>(
    personal_debts: &'a [PersonalDebt],
    period: &Period,
    paid: bool,
) -> Vec<&'a PersonalDebt> {
    personal_debts
        .iter()
        .filter(|d| d.is_paid == paid)
        .filter(|d| {
            if paid {
                period.contains(d.date)
            } else {
                period.contains(d.date) || period.is_before(d.date)
            }
        })
        .collect()
}
