//! Periodic materialization of recurring expenses.

use std::{sync::Arc, time::Duration};

use engine::Engine;
use tokio::time::MissedTickBehavior;

/// Runs the recurring generation pass on a fixed cadence.
#[derive(Debug)]
pub struct RecurringJob {
    engine: Arc<Engine>,
    every: Duration,
    run_on_start: bool,
}

impl RecurringJob {
    pub fn new(engine: Arc<Engine>, every: Duration, run_on_start: bool) -> Self {
        Self {
            engine,
            every,
            run_on_start,
        }
    }

    /// One generation pass. Failures are logged and reported as zero
    /// generated expenses.
    pub async fn tick(&self) -> usize {
        match self.engine.generate_recurring().await {
            Ok(generated) => {
                if !generated.is_empty() {
                    tracing::info!(count = generated.len(), "recurring expenses generated");
                }
                generated.len()
            }
            Err(err) => {
                tracing::error!("recurring generation failed: {err}");
                0
            }
        }
    }

    /// Loops forever, one pass per period.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.run_on_start {
            // The first tick completes immediately.
            interval.tick().await;
        }
        tracing::info!(every_secs = self.every.as_secs(), "recurring job started");
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use engine::{FixedClock, MoneyCents, NewExpenseCmd, Recurrence};
    use migration::{Migrator, MigratorTrait};

    use super::*;

    #[tokio::test]
    async fn tick_generates_due_occurrences_once() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 2, 16, 8, 0, 0).unwrap(),
        ));
        let engine = Engine::builder()
            .database(db)
            .clock(clock)
            .timezone(chrono_tz::Europe::Paris)
            .build()
            .await
            .unwrap();
        engine
            .create_expense(
                NewExpenseCmd::new(
                    MoneyCents::new(85_000),
                    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
                    "Claire",
                    "Claire",
                    "Rent",
                )
                .recurring(Recurrence::Monthly),
            )
            .await
            .unwrap();

        let job = RecurringJob::new(Arc::new(engine), Duration::from_secs(60), true);
        assert_eq!(job.tick().await, 1);
        assert_eq!(job.tick().await, 0);
    }
}
