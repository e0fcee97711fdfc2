//! Applies the Sharepot schema.
//!
//! The target is `DATABASE_URL` when set, otherwise the daemon's sqlite file
//! (`SHAREPOT__DATABASE__SQLITE`), otherwise `./sharepot.db`.
use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DB_FILE: &str = "./sharepot.db";
const USAGE: &str = "Usage: cargo run -p migration -- [up [N]|down [N]|fresh|refresh|reset|status]";

#[derive(Debug, PartialEq, Eq)]
enum Action {
    /// `None` applies every pending migration.
    Up(Option<u32>),
    Down(u32),
    Fresh,
    Refresh,
    Reset,
    Status,
}

fn parse_action(args: &[String]) -> Result<Action, String> {
    let steps = |raw: Option<&String>| {
        raw.map(|n| {
            n.parse::<u32>()
                .map_err(|_| format!("invalid step count: {n}"))
        })
        .transpose()
    };

    match args.first().map_or("up", String::as_str) {
        "up" => Ok(Action::Up(steps(args.get(1))?)),
        // Rolling back one step at a time unless told otherwise.
        "down" => Ok(Action::Down(steps(args.get(1))?.unwrap_or(1))),
        "fresh" => Ok(Action::Fresh),
        "refresh" => Ok(Action::Refresh),
        "reset" => Ok(Action::Reset),
        "status" => Ok(Action::Status),
        other => Err(format!("unknown command: {other}")),
    }
}

fn database_url(url: Option<String>, sqlite_file: Option<String>) -> String {
    url.unwrap_or_else(|| {
        format!(
            "sqlite:{}?mode=rwc",
            sqlite_file.as_deref().unwrap_or(DEFAULT_DB_FILE)
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let action = match parse_action(&args) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let db_url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("SHAREPOT__DATABASE__SQLITE").ok(),
    );
    let db = Database::connect(&db_url).await?;

    match action {
        Action::Up(steps) => migration::Migrator::up(&db, steps).await?,
        Action::Down(steps) => migration::Migrator::down(&db, Some(steps)).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Refresh => migration::Migrator::refresh(&db).await?,
        Action::Reset => migration::Migrator::reset(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
