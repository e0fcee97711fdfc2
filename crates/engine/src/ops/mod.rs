use std::sync::Arc;

use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{Clock, EngineError, Period, ResultEngine, SystemClock};

mod expenses;
mod generation;
mod personal_debts;
mod recurring;
mod reimbursements;
mod reports;

pub use generation::UNKNOWN_PARTICIPANT;
pub use recurring::RecurringUpdate;
pub use reports::MonthlyReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The calendar month containing the clock's current instant.
    pub fn current_period(&self) -> ResultEngine<Period> {
        Period::containing(self.clock.now(), self.timezone)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    clock: Option<Arc<dyn Clock>>,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Source of "now". Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    /// Household timezone used for month bounds. Defaults to UTC.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self
            .database
            .ok_or_else(|| EngineError::Validation("database is required".to_string()))?;
        Ok(Engine {
            database,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            timezone: self.timezone.unwrap_or(Tz::UTC),
        })
    }
}
