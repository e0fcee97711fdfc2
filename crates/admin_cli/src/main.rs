use std::error::Error;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use engine::{
    Category, Engine, ExpenseFilter, MoneyCents, NewExpenseCmd, NewPersonalDebtCmd,
    NewReimbursementCmd, Participants, PaymentMethod, Recurrence, UpdateRecurringCmd,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use uuid::Uuid;

mod render;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "sharepot_admin")]
#[command(about = "Admin utilities for the Sharepot household ledger")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./sharepot.db?mode=rwc",
        global = true
    )]
    database_url: String,

    /// The two household members, in order, comma separated.
    #[arg(
        long,
        env = "SHAREPOT_PARTICIPANTS",
        value_delimiter = ',',
        required = true,
        global = true
    )]
    participants: Vec<String>,

    /// Household timezone (IANA name) used for dates and months.
    #[arg(
        long,
        env = "SHAREPOT_TIMEZONE",
        default_value = "Europe/Paris",
        global = true
    )]
    timezone: String,

    /// Acting participant, required by commands that record something.
    #[arg(long, env = "SHAREPOT_USER", global = true)]
    user: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, env = "SHAREPOT_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shared expenses, split 50/50.
    Expense(Expense),
    /// Personal advances between the participants.
    Debt(Debt),
    /// Direct payments between the participants.
    Reimbursement(Reimbursement),
    /// Recurring expense templates.
    Recurring(Recurring),
    /// Monthly balance report.
    Balance(BalanceArgs),
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List(ExpenseListArgs),
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
struct ExpenseAddArgs {
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    description: String,
    /// Defaults to the acting user.
    #[arg(long)]
    paid_by: Option<String>,
    /// `YYYY-MM-DD`, defaults to now.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    #[arg(long, value_parser = parse_payment_method)]
    payment_method: Option<PaymentMethod>,
    #[arg(long)]
    bank_account: Option<String>,
    /// Also create a recurring template.
    #[arg(long, value_parser = parse_recurrence)]
    recurrence: Option<Recurrence>,
}

#[derive(Args, Debug)]
struct ExpenseListArgs {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    #[arg(long)]
    paid_by: Option<String>,
}

#[derive(Args, Debug)]
struct Debt {
    #[command(subcommand)]
    command: DebtCommand,
}

#[derive(Subcommand, Debug)]
enum DebtCommand {
    Add(DebtAddArgs),
    List {
        #[arg(long, conflicts_with = "open")]
        paid: bool,
        #[arg(long)]
        open: bool,
    },
    /// Mark an advance as paid.
    Pay { id: Uuid },
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
struct DebtAddArgs {
    #[arg(long)]
    amount: MoneyCents,
    /// Debtor.
    #[arg(long)]
    owed_by: String,
    /// Creditor, defaults to the acting user.
    #[arg(long)]
    paid_by: Option<String>,
    #[arg(long)]
    description: String,
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct Reimbursement {
    #[command(subcommand)]
    command: ReimbursementCommand,
}

#[derive(Subcommand, Debug)]
enum ReimbursementCommand {
    Add(ReimbursementAddArgs),
    List,
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
struct ReimbursementAddArgs {
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    to: String,
    /// Defaults to the acting user.
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    note: Option<String>,
    /// Advances settled by this payment, comma separated ids.
    #[arg(long, value_delimiter = ',')]
    settles: Vec<Uuid>,
}

#[derive(Args, Debug)]
struct Recurring {
    #[command(subcommand)]
    command: RecurringCommand,
}

#[derive(Subcommand, Debug)]
enum RecurringCommand {
    List {
        /// Include paused templates.
        #[arg(long)]
        all: bool,
    },
    Update(RecurringUpdateArgs),
    /// Delete a template and its instances of the current month.
    Delete { id: Uuid },
    /// Run one generation pass now.
    Generate,
}

#[derive(Args, Debug)]
struct RecurringUpdateArgs {
    id: Uuid,
    #[arg(long)]
    amount: Option<MoneyCents>,
    #[arg(long)]
    paid_by: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_category, conflicts_with = "clear_category")]
    category: Option<Category>,
    #[arg(long)]
    clear_category: bool,
    #[arg(long, value_parser = parse_payment_method, conflicts_with = "clear_payment_method")]
    payment_method: Option<PaymentMethod>,
    #[arg(long)]
    clear_payment_method: bool,
    #[arg(long, conflicts_with = "clear_bank_account")]
    bank_account: Option<String>,
    #[arg(long)]
    clear_bank_account: bool,
    #[arg(long, value_parser = parse_recurrence)]
    recurrence: Option<Recurrence>,
    /// Stop generating occurrences.
    #[arg(long, conflicts_with = "resume")]
    pause: bool,
    #[arg(long)]
    resume: bool,
}

impl RecurringUpdateArgs {
    /// Engine patch; `--clear-*` flags reset the field to none.
    fn into_cmd(self, participants: &Participants) -> CliResult<UpdateRecurringCmd> {
        let mut cmd = UpdateRecurringCmd::new(self.id);
        if let Some(amount) = self.amount {
            cmd = cmd.amount(amount);
        }
        if let Some(paid_by) = self.paid_by.as_deref() {
            cmd = cmd.paid_by(participants.resolve(paid_by)?);
        }
        if let Some(description) = self.description {
            cmd = cmd.description(description);
        }
        if self.clear_category {
            cmd = cmd.category(None);
        } else if let Some(category) = self.category {
            cmd = cmd.category(Some(category));
        }
        if self.clear_payment_method {
            cmd = cmd.payment_method(None);
        } else if let Some(method) = self.payment_method {
            cmd = cmd.payment_method(Some(method));
        }
        if self.clear_bank_account {
            cmd = cmd.bank_account(None);
        } else if let Some(account) = self.bank_account {
            cmd = cmd.bank_account(Some(account));
        }
        if let Some(recurrence) = self.recurrence {
            cmd = cmd.recurrence(recurrence);
        }
        if self.pause {
            cmd = cmd.active(false);
        } else if self.resume {
            cmd = cmd.active(true);
        }
        Ok(cmd)
    }
}

#[derive(Args, Debug)]
struct BalanceArgs {
    /// Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
    /// 1 = January, defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::try_from(raw).map_err(|err| err.to_string())
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, String> {
    PaymentMethod::try_from(raw).map_err(|err| err.to_string())
}

fn parse_recurrence(raw: &str) -> Result<Recurrence, String> {
    Recurrence::try_from(raw).map_err(|err| err.to_string())
}

/// Resolved household and output options shared by every command.
struct Context {
    engine: Engine,
    participants: Participants,
    timezone: Tz,
    user: Option<String>,
    json: bool,
}

impl Context {
    /// The acting user, which must be one of the participants.
    fn acting_user(&self) -> CliResult<String> {
        let user = self
            .user
            .as_deref()
            .ok_or("--user (or SHAREPOT_USER) is required for this command")?;
        Ok(self.participants.resolve(user)?.to_string())
    }

    fn member_or_user(&self, id: Option<&str>) -> CliResult<String> {
        match id {
            Some(id) => Ok(self.participants.resolve(id)?.to_string()),
            None => self.acting_user(),
        }
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> CliResult<DateTime<Utc>> {
        let local = self
            .timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| format!("{date} {time} does not exist in {}", self.timezone))?;
        Ok(local.with_timezone(&Utc))
    }

    fn day_start(&self, date: NaiveDate) -> CliResult<DateTime<Utc>> {
        self.at_local(date, NaiveTime::MIN)
    }

    fn day_end(&self, date: NaiveDate) -> CliResult<DateTime<Utc>> {
        let end = NaiveTime::from_hms_opt(23, 59, 59).ok_or("invalid end of day")?;
        self.at_local(date, end)
    }

    fn date_or_now(&self, date: Option<NaiveDate>) -> CliResult<DateTime<Utc>> {
        date.map_or_else(|| Ok(Utc::now()), |date| self.day_start(date))
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> CliResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "sharepot_admin={level},engine={level}",
            level = cli.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        tracing::error!("command failed: {err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> CliResult<()> {
    let participants = match cli.participants.as_slice() {
        [first, second] => Participants::new(first.as_str(), second.as_str())?,
        other => {
            return Err(format!(
                "--participants needs exactly two ids, got {}",
                other.len()
            )
            .into());
        }
    };
    let timezone: Tz = cli
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {:?}: {err}", cli.timezone))?;

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .timezone(timezone)
        .build()
        .await?;

    let ctx = Context {
        engine,
        participants,
        timezone,
        user: cli.user,
        json: cli.json,
    };

    match cli.command {
        Command::Expense(Expense { command }) => expense(&ctx, command).await,
        Command::Debt(Debt { command }) => debt(&ctx, command).await,
        Command::Reimbursement(Reimbursement { command }) => reimbursement(&ctx, command).await,
        Command::Recurring(Recurring { command }) => recurring(&ctx, command).await,
        Command::Balance(args) => balance(&ctx, args).await,
    }
}

async fn expense(ctx: &Context, command: ExpenseCommand) -> CliResult<()> {
    match command {
        ExpenseCommand::Add(args) => {
            let added_by = ctx.acting_user()?;
            let paid_by = ctx.member_or_user(args.paid_by.as_deref())?;
            let mut cmd = NewExpenseCmd::new(
                args.amount,
                ctx.date_or_now(args.date)?,
                paid_by,
                added_by,
                args.description,
            );
            if let Some(category) = args.category {
                cmd = cmd.category(category);
            }
            if let Some(method) = args.payment_method {
                cmd = cmd.payment_method(method);
            }
            if let Some(account) = args.bank_account {
                cmd = cmd.bank_account(account);
            }
            if let Some(recurrence) = args.recurrence {
                cmd = cmd.recurring(recurrence);
            }
            let expense = ctx.engine.create_expense(cmd).await?;
            ctx.emit(&expense, |e| format!("created expense: {}", render::expense(e, ctx.timezone)))
        }
        ExpenseCommand::List(args) => {
            let filter = ExpenseFilter {
                from: args.from.map(|d| ctx.day_start(d)).transpose()?,
                to: args.to.map(|d| ctx.day_end(d)).transpose()?,
                category: args.category,
                paid_by: args.paid_by,
            };
            let expenses = ctx.engine.list_expenses(&filter).await?;
            ctx.emit(&expenses, |list| render::lines(list, |e| render::expense(e, ctx.timezone)))
        }
        ExpenseCommand::Delete { id } => {
            ctx.engine.delete_expense(id).await?;
            ctx.emit(&id, |id| format!("deleted expense: {id}"))
        }
    }
}

async fn debt(ctx: &Context, command: DebtCommand) -> CliResult<()> {
    match command {
        DebtCommand::Add(args) => {
            let added_by = ctx.acting_user()?;
            let paid_by = ctx.member_or_user(args.paid_by.as_deref())?;
            let owed_by = ctx.participants.resolve(&args.owed_by)?.to_string();
            let debt = ctx
                .engine
                .create_personal_debt(NewPersonalDebtCmd::new(
                    args.amount,
                    paid_by,
                    owed_by,
                    args.description,
                    ctx.date_or_now(args.date)?,
                    added_by,
                ))
                .await?;
            ctx.emit(&debt, |d| format!("created advance: {}", render::debt(d, ctx.timezone)))
        }
        DebtCommand::List { paid, open } => {
            let filter = match (paid, open) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let debts = ctx.engine.list_personal_debts(filter).await?;
            ctx.emit(&debts, |list| render::lines(list, |d| render::debt(d, ctx.timezone)))
        }
        DebtCommand::Pay { id } => {
            let debt = ctx.engine.mark_debt_paid(id).await?;
            ctx.emit(&debt, |d| format!("paid advance: {}", render::debt(d, ctx.timezone)))
        }
        DebtCommand::Delete { id } => {
            ctx.engine.delete_personal_debt(id).await?;
            ctx.emit(&id, |id| format!("deleted advance: {id}"))
        }
    }
}

async fn reimbursement(ctx: &Context, command: ReimbursementCommand) -> CliResult<()> {
    match command {
        ReimbursementCommand::Add(args) => {
            let from = ctx.member_or_user(args.from.as_deref())?;
            let to = ctx.participants.resolve(&args.to)?.to_string();
            let mut cmd = NewReimbursementCmd::new(args.amount, from, to, ctx.date_or_now(args.date)?)
                .settles(args.settles);
            if let Some(note) = args.note {
                cmd = cmd.note(note);
            }
            let reimbursement = ctx.engine.create_reimbursement(cmd).await?;
            ctx.emit(&reimbursement, |r| {
                format!("created reimbursement: {}", render::reimbursement(r, ctx.timezone))
            })
        }
        ReimbursementCommand::List => {
            let reimbursements = ctx.engine.list_reimbursements().await?;
            ctx.emit(&reimbursements, |list| {
                render::lines(list, |r| render::reimbursement(r, ctx.timezone))
            })
        }
        ReimbursementCommand::Delete { id } => {
            let reopened = ctx.engine.delete_reimbursement(id).await?;
            ctx.emit(&reopened, |n| {
                format!("deleted reimbursement: {id} ({n} advance(s) reopened)")
            })
        }
    }
}

async fn recurring(ctx: &Context, command: RecurringCommand) -> CliResult<()> {
    match command {
        RecurringCommand::List { all } => {
            let templates = ctx.engine.list_recurring(all).await?;
            ctx.emit(&templates, |list| render::lines(list, |t| render::template(t, ctx.timezone)))
        }
        RecurringCommand::Update(args) => {
            let cmd = args.into_cmd(&ctx.participants)?;
            let update = ctx.engine.update_recurring(cmd).await?;
            ctx.emit(&update, |u| {
                format!(
                    "updated template: {} ({} instance(s) of this month updated)",
                    render::template(&u.template, ctx.timezone),
                    u.propagated
                )
            })
        }
        RecurringCommand::Delete { id } => {
            let removed = ctx.engine.delete_recurring(id).await?;
            ctx.emit(&removed, |n| {
                format!("deleted template: {id} ({n} instance(s) of this month removed)")
            })
        }
        RecurringCommand::Generate => {
            let generated = ctx.engine.generate_recurring().await?;
            ctx.emit(&generated, |list| {
                format!(
                    "generated {} expense(s)\n{}",
                    list.len(),
                    render::lines(list, |e| render::expense(e, ctx.timezone))
                )
            })
        }
    }
}

async fn balance(ctx: &Context, args: BalanceArgs) -> CliResult<()> {
    let today = Utc::now().with_timezone(&ctx.timezone);
    let year = args.year.unwrap_or_else(|| today.year());
    let month = args.month.unwrap_or_else(|| today.month());
    let report = ctx
        .engine
        .monthly_report(&ctx.participants, year, month)
        .await?;
    ctx.emit(&report, |r| render::report(r, ctx.timezone))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_args(extra: &[&str]) -> Result<RecurringUpdateArgs, clap::Error> {
        let id = Uuid::nil().to_string();
        let mut argv = vec![
            "sharepot_admin",
            "--participants",
            "Claire,Malo",
            "recurring",
            "update",
            id.as_str(),
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv)?.command {
            Command::Recurring(Recurring {
                command: RecurringCommand::Update(args),
            }) => Ok(args),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn household() -> Participants {
        Participants::new("Claire", "Malo").unwrap()
    }

    #[test]
    fn clear_flags_reset_optional_fields() {
        let cmd = update_args(&[
            "--clear-payment-method",
            "--clear-bank-account",
            "--category",
            "groceries",
        ])
        .unwrap()
        .into_cmd(&household())
        .unwrap();

        assert_eq!(cmd.payment_method, Some(None));
        assert_eq!(cmd.bank_account, Some(None));
        assert_eq!(cmd.category, Some(Some(Category::Groceries)));
        assert_eq!(cmd.amount, None);
    }

    #[test]
    fn values_are_kept_when_not_cleared() {
        let cmd = update_args(&["--bank-account", "joint", "--paid-by", "Malo"])
            .unwrap()
            .into_cmd(&household())
            .unwrap();

        assert_eq!(cmd.bank_account, Some(Some("joint".to_string())));
        assert_eq!(cmd.payment_method, None);
        assert_eq!(cmd.paid_by.as_deref(), Some("Malo"));
    }

    #[test]
    fn clearing_and_setting_the_same_field_conflict() {
        assert!(update_args(&["--bank-account", "joint", "--clear-bank-account"]).is_err());
        assert!(update_args(&["--payment-method", "card", "--clear-payment-method"]).is_err());
    }

    #[test]
    fn strangers_cannot_become_payers() {
        let err = update_args(&["--paid-by", "Mallory"])
            .unwrap()
            .into_cmd(&household())
            .unwrap_err();
        assert!(err.to_string().contains("Mallory"));
    }
}
