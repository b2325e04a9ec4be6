use chrono::{Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Once,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Error, Debug)]
#[error("{0} is not a valid recurrence pattern")]
pub struct InvalidRecurrenceError(pub String);

impl FromStr for RecurrencePattern {
    type Err = InvalidRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(InvalidRecurrenceError(s.to_string())),
        }
    }
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::Once)
    }

    /// The next occurrence after `base_millis`. `Once` returns the base
    /// unchanged; the month-based patterns use calendar arithmetic, clamping
    /// to the last day of a short month (Jan 31 + 1 month = Feb 28/29).
    pub fn next_occurrence(&self, base_millis: i64) -> i64 {
        let base = match Utc.timestamp_millis_opt(base_millis).single() {
            Some(base) => base,
            None => return base_millis,
        };
        let next = match self {
            Self::Once => return base_millis,
            Self::Daily => base.checked_add_signed(Duration::days(1)),
            Self::Weekly => base.checked_add_signed(Duration::days(7)),
            Self::Monthly => base.checked_add_months(Months::new(1)),
            Self::Quarterly => base.checked_add_months(Months::new(3)),
            Self::Yearly => base.checked_add_months(Months::new(12)),
        };
        next.map(|next| next.timestamp_millis()).unwrap_or(base_millis)
    }

    /// Steps a recurring pattern forward from `base_millis` until the result
    /// is strictly after `now`. `Once` is left untouched so an overdue one-off
    /// still fires immediately.
    pub fn advance_past(&self, base_millis: i64, now: i64) -> i64 {
        if !self.is_recurring() {
            return base_millis;
        }
        let mut next = base_millis;
        while next <= now {
            let advanced = self.next_occurrence(next);
            if advanced == next {
                break;
            }
            next = advanced;
        }
        next
    }
}

impl Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ts(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn once_returns_base_unchanged() {
        let base = ts(2024, 1, 15);
        assert_eq!(RecurrencePattern::Once.next_occurrence(base), base);
    }

    #[test]
    fn daily_and_weekly_add_whole_days() {
        let base = ts(2024, 1, 15);
        assert_eq!(
            RecurrencePattern::Daily.next_occurrence(base),
            ts(2024, 1, 16)
        );
        assert_eq!(
            RecurrencePattern::Weekly.next_occurrence(base),
            ts(2024, 1, 22)
        );
    }

    #[test]
    fn repeated_monthly_equals_adding_months() {
        // 3x monthly from 2024-01-15 lands on 2024-04-15
        let mut next = ts(2024, 1, 15);
        for _ in 0..3 {
            next = RecurrencePattern::Monthly.next_occurrence(next);
        }
        assert_eq!(next, ts(2024, 4, 15));
    }

    #[test]
    fn monthly_clamps_to_short_months() {
        assert_eq!(
            RecurrencePattern::Monthly.next_occurrence(ts(2024, 1, 31)),
            ts(2024, 2, 29)
        );
        assert_eq!(
            RecurrencePattern::Monthly.next_occurrence(ts(2023, 1, 31)),
            ts(2023, 2, 28)
        );
    }

    #[test]
    fn quarterly_and_yearly_roll_over_calendar_boundaries() {
        assert_eq!(
            RecurrencePattern::Quarterly.next_occurrence(ts(2024, 11, 5)),
            ts(2025, 2, 5)
        );
        assert_eq!(
            RecurrencePattern::Yearly.next_occurrence(ts(2024, 6, 1)),
            ts(2025, 6, 1)
        );
    }

    #[test]
    fn advance_past_steps_over_missed_occurrences() {
        let base = ts(2024, 1, 1);
        let now = ts(2024, 1, 10);
        assert_eq!(
            RecurrencePattern::Daily.advance_past(base, now),
            ts(2024, 1, 11)
        );
        assert_eq!(
            RecurrencePattern::Weekly.advance_past(base, now),
            ts(2024, 1, 15)
        );
        // a base already in the future is left alone
        assert_eq!(
            RecurrencePattern::Daily.advance_past(ts(2024, 2, 1), now),
            ts(2024, 2, 1)
        );
    }

    #[test]
    fn parses_known_patterns_only() {
        assert_eq!(
            "quarterly".parse::<RecurrencePattern>().unwrap(),
            RecurrencePattern::Quarterly
        );
        assert!("fortnightly".parse::<RecurrencePattern>().is_err());
    }
}
