//! Plain-text rendering of engine records for the terminal. Dates are shown
//! on the household calendar.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::{Expense, MonthlyReport, PersonalDebt, RecurringExpense, Reimbursement};

fn day(date: DateTime<Utc>, tz: Tz) -> String {
    date.with_timezone(&tz).format("%Y-%m-%d").to_string()
}

pub fn lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(nothing)".to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

pub fn expense(e: &Expense, tz: Tz) -> String {
    let category = e.category.map_or("-", |c| c.as_str());
    let recurring = if e.is_recurring { " [recurring]" } else { "" };
    format!(
        "{} {} {:>10} {:<13} paid by {} \"{}\"{}",
        e.id,
        day(e.date, tz),
        e.amount.to_string(),
        category,
        e.paid_by,
        e.description,
        recurring
    )
}

pub fn debt(d: &PersonalDebt, tz: Tz) -> String {
    let status = match d.paid_at {
        Some(paid_at) => format!("paid {}", day(paid_at, tz)),
        None if d.is_paid => "paid".to_string(),
        None => "open".to_string(),
    };
    format!(
        "{} {} {:>10} {} owes {} \"{}\" ({status})",
        d.id,
        day(d.date, tz),
        d.amount.to_string(),
        d.owed_by,
        d.paid_by,
        d.description
    )
}

pub fn reimbursement(r: &Reimbursement, tz: Tz) -> String {
    let mut line = format!(
        "{} {} {:>10} {} -> {}",
        r.id,
        day(r.date, tz),
        r.amount.to_string(),
        r.from,
        r.to
    );
    if let Some(note) = &r.note {
        let _ = write!(line, " \"{note}\"");
    }
    if !r.settled_debt_ids.is_empty() {
        let _ = write!(line, " settles {} advance(s)", r.settled_debt_ids.len());
    }
    line
}

pub fn template(t: &RecurringExpense, tz: Tz) -> String {
    let next = t
        .next_occurrence(tz)
        .map_or_else(|_| "-".to_string(), |next| day(next, tz));
    let state = if t.is_active { "active" } else { "paused" };
    format!(
        "{} {:>10} {:<9} paid by {} \"{}\" next {} ({state})",
        t.id,
        t.amount.to_string(),
        t.recurrence.as_str(),
        t.paid_by,
        t.description,
        next
    )
}

pub fn report(r: &MonthlyReport, timezone: Tz) -> String {
    let b = &r.balance;
    let mut out = format!(
        "Balance {}-{:02} ({timezone})\n  {} paid {}\n  {} paid {}\n  total {}\n",
        r.period.year,
        r.period.month,
        b.participant1,
        b.person1_total,
        b.participant2,
        b.person2_total,
        b.total_expenses
    );
    if b.is_settled() {
        out.push_str("  all square\n");
    } else {
        let _ = writeln!(out, "  {} owes {} {}", b.owed_by, b.owed_to, b.owed_amount);
    }

    let _ = writeln!(
        out,
        "Open advances: {} owes {}, {} owes {}",
        b.participant1, r.debts.person1_owes, b.participant2, r.debts.person2_owes
    );
    for debt_line in r.open_debts.iter().map(|d| debt(d, timezone)) {
        let _ = writeln!(out, "  {debt_line}");
    }
    if !r.settled_debts.is_empty() {
        out.push_str("Settled this month:\n");
        for debt_line in r.settled_debts.iter().map(|d| debt(d, timezone)) {
            let _ = writeln!(out, "  {debt_line}");
        }
    }

    if !r.categories.is_empty() {
        out.push_str("By category:\n");
        for total in &r.categories {
            let _ = writeln!(out, "  {:<13} {:>10}", total.category.as_str(), total.total.to_string());
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;
    use engine::{Category, MoneyCents};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn expense_line_shows_amount_and_payer() {
        let record = Expense {
            id: Uuid::nil(),
            amount: MoneyCents::new(12_34),
            date: Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap(),
            paid_by: "Claire".to_string(),
            added_by: "Claire".to_string(),
            description: "Groceries".to_string(),
            payment_method: None,
            bank_account: None,
            category: Some(Category::Groceries),
            is_recurring: true,
            recurring_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap(),
        };
        let line = expense(&record, chrono_tz::UTC);
        assert!(line.contains("2024-02-15"));
        assert!(line.contains("12.34€"));
        assert!(line.contains("groceries"));
        assert!(line.contains("paid by Claire"));
        assert!(line.ends_with("[recurring]"));
    }

    #[test]
    fn empty_list_is_explicit() {
        let none: Vec<Expense> = Vec::new();
        assert_eq!(lines(&none, |e| expense(e, Paris)), "(nothing)");
    }

    #[test]
    fn dates_follow_the_household_calendar() {
        // Local midnight on March 1st is still February in UTC.
        let first = Paris
            .with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(day(first, Paris), "2024-03-01");
        assert_eq!(day(first, chrono_tz::UTC), "2024-02-29");
    }
}
