//! Calendar month windows used by the balance engine and by recurring
//! propagation.
//!
//! Bounds are computed in the household timezone and stored as UTC instants.
//! A record is in the period iff `start <= date <= end`, where `end` is
//! 23:59:59 on the last day of the month.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Month window of `year`/`month` (1-based) in `tz`.
    pub fn month(year: i32, month: u32, tz: Tz) -> ResultEngine<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month}")))?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month}")))?;
        let last = next_first
            .pred_opt()
            .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month}")))?;

        let start = local_to_utc(tz, first.and_hms_opt(0, 0, 0))?;
        let end = local_to_utc(tz, last.and_hms_opt(23, 59, 59))?;

        Ok(Self {
            year,
            month,
            start,
            end,
        })
    }

    /// The month that contains `instant` in `tz`.
    pub fn containing(instant: DateTime<Utc>, tz: Tz) -> ResultEngine<Self> {
        let local = instant.with_timezone(&tz);
        Self::month(local.year(), local.month(), tz)
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// `true` when `instant` falls before the first instant of the period.
    #[must_use]
    pub fn is_before(&self, instant: DateTime<Utc>) -> bool {
        instant < self.start
    }
}

/// Resolves a wall-clock time to UTC, skipping forward over DST gaps.
pub(crate) fn local_to_utc(tz: Tz, naive: Option<NaiveDateTime>) -> ResultEngine<DateTime<Utc>> {
    let naive = naive.ok_or_else(|| EngineError::Validation("invalid local time".to_string()))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EngineError::Validation(format!("{naive} does not exist in {tz}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn utc_month_bounds_are_inclusive() {
        let period = Period::month(2024, 2, chrono_tz::UTC).unwrap();
        assert_eq!(period.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
        assert!(period.contains(period.start));
        assert!(period.contains(period.end));
        assert!(!period.contains(period.end + Duration::seconds(1)));
        assert!(period.is_before(period.start - Duration::seconds(1)));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period = Period::month(2023, 12, chrono_tz::UTC).unwrap();
        assert_eq!(period.end, Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn bounds_follow_household_timezone() {
        let period = Period::month(2024, 3, chrono_tz::Europe::Paris).unwrap();
        // Paris is UTC+1 on March 1st and UTC+2 on March 31st.
        assert_eq!(period.start, Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap());
        assert_eq!(period.end, Utc.with_ymd_and_hms(2024, 3, 31, 21, 59, 59).unwrap());
    }

    #[test]
    fn containing_uses_local_calendar() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        let period = Period::containing(instant, chrono_tz::Europe::Paris).unwrap();
        assert_eq!((period.year, period.month), (2024, 2));
    }

    #[test]
    fn rejects_month_thirteen() {
        assert!(Period::month(2024, 13, chrono_tz::UTC).is_err());
        assert!(Period::month(2024, 0, chrono_tz::UTC).is_err());
    }
}
