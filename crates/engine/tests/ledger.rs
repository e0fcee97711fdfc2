use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Category, Engine, EngineError, ExpenseFilter, FixedClock, MoneyCents, NewExpenseCmd,
    NewPersonalDebtCmd, NewReimbursementCmd, Participants, PaymentMethod,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

async fn engine_at(now: DateTime<Utc>) -> (Engine, Arc<FixedClock>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let clock = Arc::new(FixedClock::new(now));
    let engine = Engine::builder()
        .database(db)
        .clock(clock.clone())
        .timezone(chrono_tz::Europe::Paris)
        .build()
        .await
        .unwrap();
    (engine, clock)
}

fn household() -> Participants {
    Participants::new("Claire", "Malo").unwrap()
}

fn expense(amount: i64, date: DateTime<Utc>, paid_by: &str, description: &str) -> NewExpenseCmd {
    NewExpenseCmd::new(MoneyCents::new(amount), date, paid_by, paid_by, description)
}

fn advance(amount: i64, paid_by: &str, owed_by: &str, date: DateTime<Utc>) -> NewPersonalDebtCmd {
    NewPersonalDebtCmd::new(MoneyCents::new(amount), paid_by, owed_by, "Cinema", date, paid_by)
}

#[tokio::test]
async fn expenses_are_listed_newest_first_with_filters() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    engine
        .create_expense(expense(4_250, at(2024, 2, 3), "Claire", "Market").category(Category::Groceries))
        .await
        .unwrap();
    engine
        .create_expense(
            expense(85_000, at(2024, 2, 1), "Malo", "Rent")
                .category(Category::Rent)
                .payment_method(PaymentMethod::Transfer)
                .bank_account(" joint "),
        )
        .await
        .unwrap();
    engine
        .create_expense(expense(1_200, at(2024, 1, 20), "Claire", "Pizza"))
        .await
        .unwrap();

    let all = engine.list_expenses(&ExpenseFilter::default()).await.unwrap();
    let descriptions: Vec<_> = all.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, ["Market", "Rent", "Pizza"]);
    assert_eq!(all[1].bank_account.as_deref(), Some("joint"));
    assert_eq!(all[1].payment_method, Some(PaymentMethod::Transfer));
    assert!(!all[0].is_recurring);

    let february = engine
        .list_expenses(&ExpenseFilter {
            from: Some(at(2024, 2, 1)),
            to: Some(at(2024, 2, 29)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(february.len(), 2);

    let rent = engine
        .list_expenses(&ExpenseFilter {
            category: Some(Category::Rent),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rent.len(), 1);
    assert_eq!(rent[0].paid_by, "Malo");

    let by_claire = engine
        .list_expenses(&ExpenseFilter {
            paid_by: Some("Claire".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_claire.len(), 2);

    let err = engine
        .list_expenses(&ExpenseFilter {
            from: Some(at(2024, 3, 1)),
            to: Some(at(2024, 2, 1)),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn expenses_can_be_fetched_and_deleted() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    let created = engine
        .create_expense(expense(999, at(2024, 2, 3), "Claire", "Bread"))
        .await
        .unwrap();

    assert_eq!(engine.expense(created.id).await.unwrap(), created);
    engine.delete_expense(created.id).await.unwrap();

    let err = engine.expense(created.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.delete_expense(created.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn invalid_expenses_are_rejected() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;

    let err = engine
        .create_expense(expense(-1, at(2024, 2, 3), "Claire", "Bread"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_expense(expense(
            MoneyCents::MAX_RECORD.cents() + 1,
            at(2024, 2, 3),
            "Claire",
            "Bread",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_expense(expense(100, at(2024, 2, 3), "Claire", "  "))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("description must not be empty".to_string())
    );

    // Zero is a valid amount.
    engine
        .create_expense(expense(0, at(2024, 2, 3), "Claire", "Free sample"))
        .await
        .unwrap();
    assert_eq!(
        engine.list_expenses(&ExpenseFilter::default()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn a_debt_needs_two_different_people() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;

    let err = engine
        .create_personal_debt(advance(2_000, "Claire", "Claire", at(2024, 2, 3)))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(engine.list_personal_debts(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn debts_are_marked_paid_once() {
    let (engine, clock) = engine_at(at(2024, 2, 20)).await;
    let debt = engine
        .create_personal_debt(advance(2_000, "Malo", "Claire", at(2024, 2, 3)))
        .await
        .unwrap();
    assert!(!debt.is_paid);
    assert_eq!(debt.added_by, "Malo");

    clock.set(at(2024, 2, 22));
    let paid = engine.mark_debt_paid(debt.id).await.unwrap();
    assert!(paid.is_paid);
    assert_eq!(paid.paid_at, Some(at(2024, 2, 22)));

    let err = engine.mark_debt_paid(debt.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(engine.list_personal_debts(Some(true)).await.unwrap().len(), 1);
    assert!(engine.list_personal_debts(Some(false)).await.unwrap().is_empty());

    engine.delete_personal_debt(debt.id).await.unwrap();
    let err = engine.mark_debt_paid(debt.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn reimbursements_settle_and_reopen_debts() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    let cinema = engine
        .create_personal_debt(advance(1_500, "Malo", "Claire", at(2024, 2, 3)))
        .await
        .unwrap();
    let taxi = engine
        .create_personal_debt(advance(2_500, "Malo", "Claire", at(2024, 2, 5)))
        .await
        .unwrap();

    let reimbursement = engine
        .create_reimbursement(
            NewReimbursementCmd::new(MoneyCents::new(4_000), "Claire", "Malo", at(2024, 2, 10))
                .note("cinema + taxi")
                .settles([cinema.id, taxi.id]),
        )
        .await
        .unwrap();
    assert_eq!(reimbursement.settled_debt_ids.len(), 2);

    for debt in engine.list_personal_debts(None).await.unwrap() {
        assert!(debt.is_paid);
        assert_eq!(debt.paid_at, Some(at(2024, 2, 10)));
    }

    let listed = engine.list_reimbursements().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].note.as_deref(), Some("cinema + taxi"));
    let mut settled = listed[0].settled_debt_ids.clone();
    settled.sort();
    let mut expected = vec![cinema.id, taxi.id];
    expected.sort();
    assert_eq!(settled, expected);

    let reopened = engine.delete_reimbursement(reimbursement.id).await.unwrap();
    assert_eq!(reopened, 2);
    for debt in engine.list_personal_debts(None).await.unwrap() {
        assert!(!debt.is_paid);
        assert_eq!(debt.paid_at, None);
    }
    assert!(engine.list_reimbursements().await.unwrap().is_empty());

    let err = engine.delete_reimbursement(reimbursement.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn unknown_settled_debt_rolls_everything_back() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    let debt = engine
        .create_personal_debt(advance(1_500, "Malo", "Claire", at(2024, 2, 3)))
        .await
        .unwrap();

    let err = engine
        .create_reimbursement(
            NewReimbursementCmd::new(MoneyCents::new(1_500), "Claire", "Malo", at(2024, 2, 10))
                .settles([debt.id, Uuid::new_v4()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert!(engine.list_reimbursements().await.unwrap().is_empty());
    assert!(!engine.list_personal_debts(None).await.unwrap()[0].is_paid);
}

#[tokio::test]
async fn reimbursement_between_the_same_person_is_rejected() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    let err = engine
        .create_reimbursement(NewReimbursementCmd::new(
            MoneyCents::new(1_500),
            "Claire",
            " Claire ",
            at(2024, 2, 10),
        ))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn monthly_report_splits_the_shared_pot() {
    let (engine, _) = engine_at(at(2024, 2, 20)).await;
    engine
        .create_expense(expense(10_000, at(2024, 2, 10), "Claire", "Groceries").category(Category::Groceries))
        .await
        .unwrap();
    // Outside the month.
    engine
        .create_expense(expense(50_000, at(2024, 1, 10), "Malo", "Rent"))
        .await
        .unwrap();

    let report = engine.monthly_report(&household(), 2024, 2).await.unwrap();
    assert_eq!(report.balance.person1_total, MoneyCents::new(10_000));
    assert_eq!(report.balance.person2_total, MoneyCents::ZERO);
    assert_eq!(report.balance.total_expenses, MoneyCents::new(10_000));
    assert_eq!(report.balance.owed_amount, MoneyCents::new(5_000));
    assert_eq!(report.balance.owed_by, "Malo");
    assert_eq!(report.balance.owed_to, "Claire");
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, Category::Groceries);

    // Claire owes Malo 20.00 for an advance this month.
    engine
        .create_personal_debt(advance(2_000, "Malo", "Claire", at(2024, 2, 12)))
        .await
        .unwrap();
    let report = engine.monthly_report(&household(), 2024, 2).await.unwrap();
    assert_eq!(report.balance.owed_amount, MoneyCents::new(3_000));
    assert_eq!(report.balance.owed_by, "Malo");
    assert_eq!(report.debts.person1_owes, MoneyCents::new(2_000));
    assert_eq!(report.debts.person2_owes, MoneyCents::ZERO);
    assert_eq!(report.open_debts.len(), 1);
    assert!(report.settled_debts.is_empty());

    let current = engine.current_report(&household()).await.unwrap();
    assert_eq!(current, report);
}

#[tokio::test]
async fn open_advances_carry_into_later_months() {
    let (engine, _) = engine_at(at(2024, 3, 20)).await;
    engine
        .create_personal_debt(advance(2_000, "Malo", "Claire", at(2024, 1, 12)))
        .await
        .unwrap();

    let report = engine.monthly_report(&household(), 2024, 3).await.unwrap();
    assert_eq!(report.debts.person1_owes, MoneyCents::new(2_000));
    assert_eq!(report.balance.owed_amount, MoneyCents::new(2_000));
    assert_eq!(report.balance.owed_by, "Claire");
    assert_eq!(report.balance.owed_to, "Malo");

    let err = engine.monthly_report(&household(), 2024, 13).await.unwrap_err();
    assert!(err.is_validation());
}
