use serde::{Deserialize, Serialize};

use crate::{
    Balance, CategoryTotal, DebtSummary, ExpenseFilter, Participants, Period, PersonalDebt,
    ResultEngine, debts_for_display, expenses_by_category, monthly_balance, personal_debt_summary,
};

use super::Engine;

/// Everything shown for one month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub period: Period,
    pub balance: Balance,
    pub debts: DebtSummary,
    pub categories: Vec<CategoryTotal>,
    pub open_debts: Vec<PersonalDebt>,
    pub settled_debts: Vec<PersonalDebt>,
}

impl Engine {
    /// Builds the report of `year`/`month` (1 = January) in the household
    /// timezone.
    pub async fn monthly_report(
        &self,
        participants: &Participants,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthlyReport> {
        let period = Period::month(year, month, self.timezone)?;
        self.report_for(participants, period).await
    }

    /// Report of the month containing the clock's current instant.
    pub async fn current_report(&self, participants: &Participants) -> ResultEngine<MonthlyReport> {
        let period = self.current_period()?;
        self.report_for(participants, period).await
    }

    async fn report_for(
        &self,
        participants: &Participants,
        period: Period,
    ) -> ResultEngine<MonthlyReport> {
        let expenses = self
            .list_expenses(&ExpenseFilter {
                from: Some(period.start),
                to: Some(period.end),
                ..Default::default()
            })
            .await?;
        let personal_debts = self.list_personal_debts(None).await?;
        let reimbursements = self.list_reimbursements().await?;

        let balance = monthly_balance(
            &expenses,
            participants,
            &period,
            &personal_debts,
            &reimbursements,
        );
        let debts = personal_debt_summary(&personal_debts, participants, &period);
        let categories = expenses_by_category(&expenses, &period);
        let open_debts = debts_for_display(&personal_debts, &period, false)
            .into_iter()
            .cloned()
            .collect();
        let settled_debts = debts_for_display(&personal_debts, &period, true)
            .into_iter()
            .cloned()
            .collect();

        tracing::debug!(
            year = period.year,
            month = period.month,
            expenses = expenses.len(),
            "monthly report built"
        );
        Ok(MonthlyReport {
            period,
            balance,
            debts,
            categories,
            open_debts,
            settled_debts,
        })
    }
}
